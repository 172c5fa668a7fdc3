//! Stream metadata types produced by probing.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw probe output for a media file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Path to the media file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Container format name (e.g. "matroska,webm", "mov,mp4,m4a,3gp,3g2,mj2").
    pub container: String,
    /// Duration in seconds, fractional.
    pub duration_secs: Option<f64>,
    /// Overall bitrate in bits per second.
    pub bitrate: Option<u64>,
    /// Video streams in ffprobe index order.
    pub video_streams: Vec<VideoStream>,
    /// Audio streams in ffprobe index order.
    pub audio_streams: Vec<AudioStream>,
    /// Subtitle streams in ffprobe index order.
    pub subtitle_streams: Vec<SubtitleStream>,
}

/// A video stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoStream {
    /// Stream index as reported by the probe tool.
    pub index: u32,
    /// Video codec name (e.g. "h264", "hevc").
    pub codec: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Display aspect ratio as reported (e.g. "16:9").
    pub aspect_ratio: Option<String>,
    /// Frame rate in frames per second, rounded to two decimals.
    pub frame_rate: Option<f64>,
    /// Stream bitrate in bits per second.
    pub bitrate: Option<u64>,
    /// Codec profile (e.g. "High", "Main 10").
    pub profile: Option<String>,
    /// Resolution bucket derived from the dimensions.
    pub resolution: ResolutionCategory,
}

/// An audio stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioStream {
    /// Stream index as reported by the probe tool.
    pub index: u32,
    /// Audio codec name (e.g. "aac", "truehd").
    pub codec: String,
    /// Number of channels.
    pub channels: u32,
    /// Channel layout bucket derived from channel count and codec.
    pub channel_type: AudioChannelType,
    /// Language tag (e.g. "eng").
    pub language: Option<String>,
    /// Stream title.
    pub title: Option<String>,
    /// Stream bitrate in bits per second.
    pub bitrate: Option<u64>,
    /// Sample rate in Hz.
    pub sample_rate: Option<u32>,
    /// Whether this is the default track.
    pub default: bool,
}

/// A subtitle stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleStream {
    /// Stream index as reported by the probe tool.
    pub index: u32,
    /// Subtitle codec name (e.g. "subrip", "hdmv_pgs_subtitle").
    pub codec: String,
    /// Language tag (e.g. "eng").
    pub language: Option<String>,
    /// Stream title.
    pub title: Option<String>,
    /// Whether this is a forced track.
    pub forced: bool,
    /// Whether this is the default track.
    pub default: bool,
}

/// Resolution buckets, by the larger of width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionCategory {
    #[serde(rename = "4K")]
    FourK,
    #[serde(rename = "1080p")]
    Hd1080,
    #[serde(rename = "720p")]
    Hd720,
    #[serde(rename = "SD")]
    Sd,
    Unknown,
}

/// Audio channel layout buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioChannelType {
    Mono,
    Stereo,
    #[serde(rename = "5.1")]
    Surround51,
    #[serde(rename = "7.1")]
    Surround71,
    Atmos,
    Unknown,
}

/// Bucket a video resolution by its larger dimension.
pub fn categorize_resolution(width: u32, height: u32) -> ResolutionCategory {
    let pixels = width.max(height);
    if pixels >= 2160 {
        ResolutionCategory::FourK
    } else if pixels >= 1080 {
        ResolutionCategory::Hd1080
    } else if pixels >= 720 {
        ResolutionCategory::Hd720
    } else if pixels > 0 {
        ResolutionCategory::Sd
    } else {
        ResolutionCategory::Unknown
    }
}

/// Bucket an audio channel count, detecting Atmos from the codec name.
pub fn categorize_channels(channels: u32, codec: Option<&str>) -> AudioChannelType {
    // Atmos usually ships in TrueHD or E-AC-3 containers
    if let Some(codec) = codec {
        let codec = codec.to_lowercase();
        if (codec.contains("atmos") || codec.contains("truehd")) && channels >= 6 {
            return AudioChannelType::Atmos;
        }
    }

    match channels {
        c if c >= 8 => AudioChannelType::Surround71,
        c if c >= 6 => AudioChannelType::Surround51,
        2 => AudioChannelType::Stereo,
        1 => AudioChannelType::Mono,
        _ => AudioChannelType::Unknown,
    }
}

impl MediaInfo {
    /// Get the primary (first) video stream.
    pub fn primary_video(&self) -> Option<&VideoStream> {
        self.video_streams.first()
    }

    /// Get the resolution bucket of the primary video stream.
    pub fn resolution(&self) -> Option<ResolutionCategory> {
        self.primary_video().map(|v| v.resolution)
    }
}

impl std::fmt::Display for ResolutionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionCategory::FourK => write!(f, "4K"),
            ResolutionCategory::Hd1080 => write!(f, "1080p"),
            ResolutionCategory::Hd720 => write!(f, "720p"),
            ResolutionCategory::Sd => write!(f, "SD"),
            ResolutionCategory::Unknown => write!(f, "Unknown"),
        }
    }
}

impl std::fmt::Display for AudioChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioChannelType::Mono => write!(f, "Mono"),
            AudioChannelType::Stereo => write!(f, "Stereo"),
            AudioChannelType::Surround51 => write!(f, "5.1"),
            AudioChannelType::Surround71 => write!(f, "7.1"),
            AudioChannelType::Atmos => write!(f, "Atmos"),
            AudioChannelType::Unknown => write!(f, "Unknown"),
        }
    }
}
