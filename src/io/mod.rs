pub mod bed;
pub mod compression;
pub mod coverage;
pub mod store;

use std::fs::File;
use std::io::{
    BufWriter,
    Write,
};
use std::path::Path;

use anyhow::Context;
use flate2::write::GzEncoder;

pub(crate) type GzWriter = GzEncoder<BufWriter<File>>;

pub(crate) fn create_gz<P: AsRef<Path>>(path: P) -> anyhow::Result<GzWriter> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    Ok(GzEncoder::new(
        BufWriter::new(file),
        flate2::Compression::default(),
    ))
}

/// Writes the gzip trailer and flushes. Dropping an encoder would do
/// the same but swallows write errors.
pub(crate) fn finish_gz(writer: GzWriter) -> anyhow::Result<()> {
    writer.finish()?.flush()?;
    Ok(())
}

pub(crate) fn finish_gz_csv(
    writer: csv::Writer<GzWriter>
) -> anyhow::Result<()> {
    finish_gz(writer.into_inner().map_err(|err| err.into_error())?)
}
