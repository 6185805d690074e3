use std::fmt::Display;
use std::str::FromStr;

/// Provenance log of a store directory.
///
/// Every command that creates or rewrites a store appends one section:
/// a `methsweep {tool} version {version}` header line followed by the
/// invocation parameters, indented two spaces. The log is never
/// truncated, so a filtered store still names the prepare run it came
/// from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunInfo {
    sections: Vec<RunSection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RunSection {
    header: String,
    params: Vec<(String, String)>,
}

impl RunInfo {
    pub fn new<I>(
        tool: &str,
        params: I,
    ) -> Self
    where
        I: IntoIterator<Item = (String, String)>, {
        let mut info = Self::default();
        info.record(tool, params);
        info
    }

    /// Appends a section for one invocation of `tool`.
    pub fn record<I>(
        &mut self,
        tool: &str,
        params: I,
    ) where
        I: IntoIterator<Item = (String, String)>, {
        self.sections.push(RunSection {
            header: format!(
                "{} {} version {}",
                env!("CARGO_PKG_NAME"),
                tool,
                env!("CARGO_PKG_VERSION")
            ),
            params: params.into_iter().collect(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Display for RunInfo {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        for section in &self.sections {
            writeln!(f, "{}", section.header)?;
            for (key, value) in &section.params {
                writeln!(f, "  {}: {}", key, value)?;
            }
        }
        Ok(())
    }
}

impl FromStr for RunInfo {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut sections: Vec<RunSection> = Vec::new();
        for line in s.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let param = line
                .strip_prefix("  ")
                .and_then(|rest| rest.split_once(": "));
            match (param, sections.last_mut()) {
                (Some((key, value)), Some(section)) => {
                    section
                        .params
                        .push((key.to_string(), value.to_string()));
                },
                _ => {
                    sections.push(RunSection {
                        header: line.to_string(),
                        params: Vec::new(),
                    });
                },
            }
        }
        Ok(Self { sections })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_and_parse_roundtrip() {
        let mut info = RunInfo::new(
            "prepare",
            [("input_files".to_string(), "2".to_string())],
        );
        info.record(
            "filter",
            [("min_meth".to_string(), "50".to_string())],
        );

        let rendered = info.to_string();
        assert!(rendered.starts_with(&format!(
            "methsweep prepare version {}\n  input_files: 2\n",
            env!("CARGO_PKG_VERSION")
        )));
        assert!(rendered.contains("methsweep filter version"));

        let reparsed: RunInfo = rendered.parse().unwrap();
        assert_eq!(reparsed, info);
    }

    #[test]
    fn parse_tolerates_empty_input() {
        let info: RunInfo = "".parse().unwrap();
        assert!(info.is_empty());
    }
}
