// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/input/detection_log.rs - 检测日志（JSON Lines）输入
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Hoopline Developers

//! 检测日志：每行一个 JSON 对象，对应一帧检测器原始输出
//!
//! ```text
//! {"frame": 12, "detections": [{"label": "ball", "score": 0.81, "bbox": [140, 20, 160, 40]},
//!                              {"label": 1, "score": 0.66, "bbox": [100, 100, 200, 150]}]}
//! ```
//!
//! `frame` 缺省时按行顺序编号；空行跳过。

use std::fs::File;
use std::io::{BufRead, BufReader};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, decode_url_path,
  input::DetectionFrame,
  model::{DetectItem, DetectResult, ShotLabel},
};

#[derive(Error, Debug)]
pub enum DetectionLogError {
  #[error("URI scheme mismatch: {0}")]
  SchemeMismatch(String),
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("第 {line} 行解析失败: {source}")]
  ParseError {
    line: usize,
    source: serde_json::Error,
  },
}

#[derive(Deserialize)]
struct LogLine {
  frame: Option<u64>,
  #[serde(default)]
  detections: Vec<DetectItem<ShotLabel>>,
}

pub struct DetectionLog<R> {
  reader: R,
  line_no: usize,
  next_index: u64,
  buffer: String,
}

impl<R: BufRead> DetectionLog<R> {
  pub fn new(reader: R) -> Self {
    Self {
      reader,
      line_no: 0,
      next_index: 0,
      buffer: String::new(),
    }
  }

  fn parse_line(&mut self) -> Result<DetectionFrame, DetectionLogError> {
    let line: LogLine = serde_json::from_str(self.buffer.trim()).map_err(|source| {
      DetectionLogError::ParseError {
        line: self.line_no,
        source,
      }
    })?;
    let index = line.frame.unwrap_or(self.next_index);
    self.next_index = index.saturating_add(1);
    Ok(DetectionFrame {
      index,
      result: DetectResult::from(line.detections),
    })
  }
}

impl<R: BufRead> Iterator for DetectionLog<R> {
  type Item = Result<DetectionFrame, DetectionLogError>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      self.buffer.clear();
      match self.reader.read_line(&mut self.buffer) {
        Ok(0) => return None,
        Ok(_) => {
          self.line_no += 1;
          if self.buffer.trim().is_empty() {
            continue;
          }
          return Some(self.parse_line());
        }
        Err(e) => return Some(Err(e.into())),
      }
    }
  }
}

/// 从文件读取检测日志：`jsonl:///path/to/log.jsonl`
impl FromUrlWithScheme for DetectionLog<BufReader<File>> {
  const SCHEME: &'static str = "jsonl";
}

impl FromUrl for DetectionLog<BufReader<File>> {
  type Error = DetectionLogError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(DetectionLogError::SchemeMismatch(url.scheme().to_string()));
    }

    let path = decode_url_path(url);
    debug!("打开检测日志: {}", path);
    let file = File::open(&path)?;
    Ok(DetectionLog::new(BufReader::new(file)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::frame::BBox;
  use std::io::Cursor;

  #[test]
  fn reads_frames_and_skips_blank_lines() {
    let data = r#"{"frame": 3, "detections": [{"label": "ball", "score": 0.9, "bbox": [140, 20, 160, 40]}]}

{"detections": []}
{"frame": 10}
"#;
    let frames: Vec<DetectionFrame> = DetectionLog::new(Cursor::new(data))
      .collect::<Result<_, _>>()
      .unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].index, 3);
    assert_eq!(frames[0].result.items[0].bbox, BBox::new(140.0, 20.0, 160.0, 40.0));
    assert_eq!(frames[1].index, 4);
    assert!(frames[1].result.is_empty());
    assert_eq!(frames[2].index, 10);
  }

  #[test]
  fn implicit_index_after_max_frame_saturates() {
    let data = "{\"frame\": 18446744073709551615}\n{\"detections\": []}\n";
    let frames: Vec<DetectionFrame> = DetectionLog::new(Cursor::new(data))
      .collect::<Result<_, _>>()
      .unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].index, u64::MAX);
    assert_eq!(frames[1].index, u64::MAX);
  }

  #[test]
  fn parse_error_reports_line_number() {
    let data = "{\"frame\": 1}\nnot json\n";
    let mut log = DetectionLog::new(Cursor::new(data));
    assert!(log.next().unwrap().is_ok());
    match log.next().unwrap() {
      Err(DetectionLogError::ParseError { line, .. }) => assert_eq!(line, 2),
      other => panic!("unexpected: {:?}", other.map(|f| f.index)),
    }
    assert!(log.next().is_none());
  }

  #[test]
  fn opens_file_from_url() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.jsonl");
    std::fs::write(&path, "{\"frame\": 0}\n").unwrap();
    let url = Url::from_file_path(&path).unwrap();
    let url = Url::parse(&url.as_str().replacen("file:", "jsonl:", 1)).unwrap();
    let log = DetectionLog::<BufReader<File>>::from_url(&url).unwrap();
    assert_eq!(log.count(), 1);

    let wrong = Url::parse("image:///tmp/a.png").unwrap();
    assert!(matches!(
      DetectionLog::<BufReader<File>>::from_url(&wrong),
      Err(DetectionLogError::SchemeMismatch(_))
    ));
  }
}
