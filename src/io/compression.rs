use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Compression of a text table on disk, detected from the file
/// extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    None,
    #[default]
    Gz,
}

impl Compression {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("gz") => Compression::Gz,
            _ => Compression::None,
        }
    }

    pub fn get_decoder(
        &self,
        handle: File,
    ) -> Box<dyn Read> {
        match self {
            // MultiGzDecoder also accepts block-gzipped files produced by
            // bgzip, which are concatenated gzip members.
            Compression::Gz => {
                Box::new(flate2::read::MultiGzDecoder::new(handle))
            },
            Compression::None => Box::new(handle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_from_extension() {
        assert_eq!(Compression::from_path("1.csv.gz"), Compression::Gz);
        assert_eq!(Compression::from_path("1.csv"), Compression::None);
        assert_eq!(Compression::from_path("noext"), Compression::None);
    }
}
