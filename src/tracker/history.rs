// 该文件是 Hoopline （篮下轨迹） 项目的一部分。
// src/tracker/history.rs - 定长环形缓冲
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

use std::collections::VecDeque;

use crate::frame::BBox;

/// 定长 FIFO：写满后丢弃最旧的元素，按时间先后迭代
#[derive(Debug, Clone, PartialEq)]
pub struct RingBuffer<T> {
  items: VecDeque<T>,
  capacity: usize,
}

impl<T> RingBuffer<T> {
  pub fn with_capacity(capacity: usize) -> Self {
    let capacity = capacity.max(1);
    Self {
      items: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  pub fn push(&mut self, item: T) {
    if self.items.len() == self.capacity {
      self.items.pop_front();
    }
    self.items.push_back(item);
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn clear(&mut self) {
    self.items.clear();
  }

  /// 最近的两个元素 `(前一个, 最新)`
  pub fn last_pair(&self) -> Option<(&T, &T)> {
    let n = self.items.len();
    if n < 2 {
      return None;
    }
    Some((&self.items[n - 2], &self.items[n - 1]))
  }

  pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
    self.items.iter()
  }
}

impl RingBuffer<BBox> {
  /// 缓冲内所有框的逐坐标算术平均
  pub fn mean(&self) -> Option<BBox> {
    BBox::mean(self.items.iter())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn drops_oldest_when_full() {
    let mut buffer = RingBuffer::with_capacity(3);
    for i in 0..5 {
      buffer.push(i);
    }
    assert_eq!(buffer.len(), 3);
    assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    assert_eq!(buffer.last_pair(), Some((&3, &4)));
  }

  #[test]
  fn last_pair_needs_two() {
    let mut buffer = RingBuffer::with_capacity(4);
    assert!(buffer.last_pair().is_none());
    buffer.push(1);
    assert!(buffer.last_pair().is_none());
  }

  #[test]
  fn mean_of_boxes() {
    let mut buffer = RingBuffer::with_capacity(2);
    assert!(buffer.mean().is_none());
    buffer.push(BBox::new(0.0, 0.0, 10.0, 10.0));
    buffer.push(BBox::new(10.0, 10.0, 20.0, 20.0));
    buffer.push(BBox::new(20.0, 20.0, 30.0, 30.0));
    assert_eq!(buffer.mean(), Some(BBox::new(15.0, 15.0, 25.0, 25.0)));
  }
}
