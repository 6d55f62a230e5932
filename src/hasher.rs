use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use clap::ValueEnum;
use image::DynamicImage;
use image_hasher::{HashAlg, Hasher, HasherConfig};

use crate::hamming::HashValue;

/// 感知哈希算法
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// 均值哈希 + DCT 预处理
    Phash,
    /// 均值哈希
    Mean,
    /// 水平梯度哈希，即 dHash
    #[value(alias = "dhash")]
    Gradient,
    /// 垂直梯度哈希
    VertGradient,
    /// 块哈希
    Blockhash,
}

impl HashAlgorithm {
    fn name(self) -> &'static str {
        match self {
            Self::Phash => "phash",
            Self::Mean => "mean",
            Self::Gradient => "gradient",
            Self::VertGradient => "vert-gradient",
            Self::Blockhash => "blockhash",
        }
    }
}

/// 哈希算法及其尺寸，写入数据库以避免混用不同算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKind {
    pub algorithm: HashAlgorithm,
    pub size: u32,
}

impl Default for HashKind {
    fn default() -> Self {
        Self { algorithm: HashAlgorithm::Phash, size: 8 }
    }
}

impl fmt::Display for HashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm.name(), self.size)
    }
}

impl FromStr for HashKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (alg, size) = s.split_once(':').ok_or_else(|| anyhow!("无效的哈希类型: {}", s))?;
        let algorithm =
            <HashAlgorithm as ValueEnum>::from_str(alg, true).map_err(|e| anyhow!(e))?;
        Ok(Self { algorithm, size: size.parse()? })
    }
}

/// 图片感知哈希计算器
pub struct ImageHasher {
    kind: HashKind,
    hasher: Hasher,
}

impl ImageHasher {
    pub fn new(kind: HashKind) -> Self {
        let config = HasherConfig::new().hash_size(kind.size, kind.size);
        let config = match kind.algorithm {
            HashAlgorithm::Phash => config.hash_alg(HashAlg::Mean).preproc_dct(),
            HashAlgorithm::Mean => config.hash_alg(HashAlg::Mean),
            HashAlgorithm::Gradient => config.hash_alg(HashAlg::Gradient),
            HashAlgorithm::VertGradient => config.hash_alg(HashAlg::VertGradient),
            HashAlgorithm::Blockhash => config.hash_alg(HashAlg::Blockhash),
        };
        Self { kind, hasher: config.to_hasher() }
    }

    /// 哈希的有效比特数
    pub fn width(&self) -> u32 {
        self.kind.size * self.kind.size
    }

    pub fn hash_image(&self, image: &DynamicImage) -> Result<HashValue> {
        let hash = self.hasher.hash_image(image);
        Ok(HashValue::from_bytes(hash.as_bytes(), self.width())?)
    }

    /// 计算图片旋转 0/90/180/270 度后的哈希，去除重复值
    ///
    /// 第一个元素总是原图的哈希。
    pub fn hash_rotations(&self, image: &DynamicImage) -> Result<Vec<HashValue>> {
        let mut hashes = vec![self.hash_image(image)?];
        for rotated in [image.rotate90(), image.rotate180(), image.rotate270()] {
            let hash = self.hash_image(&rotated)?;
            if !hashes.contains(&hash) {
                hashes.push(hash);
            }
        }
        Ok(hashes)
    }

    /// 解码并计算哈希，无法识别的数据返回错误
    pub fn hash_bytes(&self, data: &[u8]) -> Result<HashValue> {
        self.hash_image(&image::load_from_memory(data)?)
    }

    pub fn hash_file(&self, path: impl AsRef<Path>) -> Result<HashValue> {
        self.hash_image(&load_image(path)?)
    }
}

/// 读取并解码图片文件
pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let data = std::fs::read(path)?;
    Ok(image::load_from_memory(&data)?)
}
