#![allow(dead_code)]

use super::booking::BookingStatus;

/// 状態遷移のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// 終端状態（completed / cancelled）からの遷移は不可
    TerminalStatus { from: BookingStatus },
    /// 遷移表にない遷移（状態の飛び越し・逆行など）
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
}

/// アクセス権のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// 予約の顧客本人でない
    NotBookingCustomer,
    /// 対象自転車を所有する事業者でない
    NotBikeOwner,
}
