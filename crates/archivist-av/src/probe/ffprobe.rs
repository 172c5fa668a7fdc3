//! FFprobe invocation and output parsing.

use super::types::*;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: String,
    duration: Option<String>,
    size: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: u32,
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    display_aspect_ratio: Option<String>,
    r_frame_rate: Option<String>,
    bit_rate: Option<String>,
    profile: Option<String>,
    channels: Option<u32>,
    sample_rate: Option<String>,
    #[serde(default)]
    disposition: FfprobeDisposition,
    #[serde(default)]
    tags: FfprobeTags,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeDisposition {
    #[serde(default)]
    default: u8,
    #[serde(default)]
    forced: u8,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeTags {
    language: Option<String>,
    title: Option<String>,
}

/// Probe a media file using ffprobe.
pub fn probe_with_ffprobe(path: &Path) -> Result<MediaInfo> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found("ffprobe")
            } else {
                Error::Io(e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool_failed(
            "ffprobe",
            format!("exit code {:?}: {}", output.status.code(), stderr),
        ));
    }

    let json_str = String::from_utf8(output.stdout)
        .map_err(|e| Error::parse_error("ffprobe", format!("invalid UTF-8: {}", e)))?;

    let ff_output: FfprobeOutput = serde_json::from_str(&json_str)?;

    Ok(parse_ffprobe_output(path, ff_output))
}

fn parse_ffprobe_output(path: &Path, output: FfprobeOutput) -> MediaInfo {
    let mut info = MediaInfo {
        path: path.to_path_buf(),
        size_bytes: output
            .format
            .size
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
        container: output.format.format_name,
        duration_secs: output.format.duration.and_then(|s| s.parse().ok()),
        bitrate: output.format.bit_rate.and_then(|s| s.parse().ok()),
        video_streams: Vec::new(),
        audio_streams: Vec::new(),
        subtitle_streams: Vec::new(),
    };

    for stream in output.streams {
        match stream.codec_type.as_str() {
            "video" => {
                let width = stream.width.unwrap_or(0);
                let height = stream.height.unwrap_or(0);
                info.video_streams.push(VideoStream {
                    index: stream.index,
                    codec: stream.codec_name.unwrap_or_default(),
                    width,
                    height,
                    aspect_ratio: stream.display_aspect_ratio,
                    frame_rate: stream.r_frame_rate.and_then(|s| parse_frame_rate(&s)),
                    bitrate: stream.bit_rate.and_then(|s| s.parse().ok()),
                    profile: stream.profile,
                    resolution: categorize_resolution(width, height),
                });
            }
            "audio" => {
                let channels = stream.channels.unwrap_or(0);
                info.audio_streams.push(AudioStream {
                    index: stream.index,
                    codec: stream.codec_name.clone().unwrap_or_default(),
                    channels,
                    channel_type: categorize_channels(channels, stream.codec_name.as_deref()),
                    language: stream.tags.language,
                    title: stream.tags.title,
                    bitrate: stream.bit_rate.and_then(|s| s.parse().ok()),
                    sample_rate: stream.sample_rate.and_then(|s| s.parse().ok()),
                    default: stream.disposition.default == 1,
                });
            }
            "subtitle" => {
                info.subtitle_streams.push(SubtitleStream {
                    index: stream.index,
                    codec: stream.codec_name.unwrap_or_default(),
                    language: stream.tags.language,
                    title: stream.tags.title,
                    forced: stream.disposition.forced == 1,
                    default: stream.disposition.default == 1,
                });
            }
            _ => {}
        }
    }

    info
}

/// Parse an ffprobe rational frame rate ("24000/1001") to fps, rounded to
/// two decimals.
fn parse_frame_rate(rate_str: &str) -> Option<f64> {
    let parts: Vec<&str> = rate_str.split('/').collect();
    if parts.len() != 2 {
        return None;
    }
    let num: f64 = parts[0].parse().ok()?;
    let den: f64 = parts[1].parse().ok()?;
    if den <= 0.0 {
        return None;
    }
    Some((num / den * 100.0).round() / 100.0)
}
