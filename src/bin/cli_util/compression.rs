use clap::ValueEnum;
use iostack::compression::CompressionType;

#[derive(Debug, Clone, ValueEnum)]
pub enum CompressionLevel {
    Fastest,
    Best,
    Default,
}

impl From<CompressionLevel> for flate2::Compression {
    fn from(level: CompressionLevel) -> Self {
        match level {
            CompressionLevel::Fastest => flate2::Compression::fast(),
            CompressionLevel::Best => flate2::Compression::best(),
            CompressionLevel::Default => flate2::Compression::default(),
        }
    }
}

#[derive(Default, Debug, Clone, ValueEnum)]
pub enum BinCompressionType {
    Passthrough,
    #[default]
    Lz4,
    Gzip,
    Snappy,
}

impl From<BinCompressionType> for CompressionType {
    fn from(value: BinCompressionType) -> Self {
        match value {
            BinCompressionType::Passthrough => CompressionType::Passthrough,
            BinCompressionType::Lz4 => CompressionType::Lz4,
            BinCompressionType::Gzip => CompressionType::Gzip,
            BinCompressionType::Snappy => CompressionType::Snappy,
        }
    }
}
