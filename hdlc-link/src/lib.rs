//! HDLC link layer for DLMS/COSEM (IEC 62056-46)
//!
//! Frame codec, stream resynchronization, segmentation and SNRM/UA parameter
//! negotiation. No I/O: the transport pushes octets into an
//! [`HdlcStreamDecoder`] and writes the output of [`HdlcFrame::encode`].
//!
//! # TODO
//!
//! ## HDLC 帧层
//! - [x] FCS/HCS 计算和验证 (CRC-16/X-25)
//! - [x] 帧格式字段 (Type 3, 分段位, 11 位长度)
//! - [x] HDLC 地址编码/解码 (1/2/4 字节)
//! - [x] 控制字段 (I/S/U 帧, N(S)/N(R) 递增)
//! - [x] HDLC 帧编码/解码
//! - [x] 字节流重同步
//! - [x] 帧分段和重组
//! - [x] SNRM/UA 参数协商
//! - [x] LLC Header支持
//! - [x] HDLC统计信息收集
//!
//! ## 会话层 (不在本 crate)
//! - [ ] 滑动窗口和重传
//! - [ ] 连接状态机

pub mod hdlc;

pub use hdlc::*;
pub use hdlc_core::{CheckSequence, HdlcError, HdlcResult, Information};
