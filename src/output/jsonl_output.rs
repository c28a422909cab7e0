// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/output/jsonl_output.rs - 逐帧 JSON Lines 输出
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

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, decode_url_path,
  frame::FrameDetections,
  output::Render,
  tracker::FrameReport,
};

#[derive(Error, Debug)]
pub enum JsonLinesOutputError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  SerializeError(#[from] serde_json::Error),
}

/// 每帧一行 `FrameReport`：`jsonl:///path/to/report.jsonl`
pub struct JsonLinesOutput {
  path: String,
  writer: Mutex<BufWriter<File>>,
}

impl FromUrlWithScheme for JsonLinesOutput {
  const SCHEME: &'static str = "jsonl";
}

impl FromUrl for JsonLinesOutput {
  type Error = JsonLinesOutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(JsonLinesOutputError::SchemeMismatch(url.scheme().to_string()));
    }

    let path = decode_url_path(url);
    if let Some(parent) = Path::new(&path).parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }
    let file = File::create(&path)?;
    debug!("写入逐帧结果: {}", path);

    Ok(JsonLinesOutput {
      path,
      writer: Mutex::new(BufWriter::new(file)),
    })
  }
}

impl Render<FrameDetections, FrameReport> for JsonLinesOutput {
  type Error = JsonLinesOutputError;

  fn render_result(&self, _frame: &FrameDetections, report: &FrameReport) -> Result<(), Self::Error> {
    let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
    serde_json::to_writer(&mut *writer, report)?;
    writer.write_all(b"\n")?;
    Ok(())
  }

  fn finish(&self) -> Result<(), Self::Error> {
    let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
    writer.flush()?;
    debug!("逐帧结果已写入: {}", self.path);
    Ok(())
  }
}
