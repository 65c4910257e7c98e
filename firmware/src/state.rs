//! グローバル共有状態管理
//!
//! サンプリングタスクと監視タスクで共有するモーターを保持します。

use core::sync::atomic::AtomicBool;

use bldc_six_step::SharedMotor;

use crate::hardware::Board;

/// モーター（クリティカルセクションで保護）
pub static MOTOR: SharedMotor<Board> = SharedMotor::new();

/// サンプリング開始フラグ（`init_motor` で有効化される）
pub static SAMPLING_ENABLED: AtomicBool = AtomicBool::new(false);
