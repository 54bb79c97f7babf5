//! 状态机模块
//!
//! 描述 Match 的合法生命周期，以及状态到展示文案/颜色的查找表。
//! 后端是权威实现，客户端仅用于展示以及禁用不可用的操作。

use serde::{Deserialize, Serialize};
use std::fmt;

// =========================================================
// 展示信息 (Display)
// =========================================================

/// 状态徽章的色调
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Primary,
    Warn,
    Accent,
    Neutral,
}

impl StatusTone {
    /// 对应的 daisyUI 徽章样式
    pub fn badge_class(&self) -> &'static str {
        match self {
            StatusTone::Primary => "badge badge-primary",
            StatusTone::Warn => "badge badge-warning",
            StatusTone::Accent => "badge badge-accent",
            StatusTone::Neutral => "badge badge-ghost",
        }
    }
}

/// 状态的展示元组：本地化文案 + 色调
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDisplay {
    pub label: &'static str,
    pub tone: StatusTone,
}

impl StatusDisplay {
    const fn new(label: &'static str, tone: StatusTone) -> Self {
        Self { label, tone }
    }
}

const UNKNOWN_DISPLAY: StatusDisplay = StatusDisplay::new("Desconhecido", StatusTone::Neutral);

// =========================================================
// Match 状态
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Pending,
    Approved,
    Rejected,
    InProgress,
    Completed,
    /// 后端返回了客户端不认识的状态
    #[default]
    #[serde(other)]
    Unknown,
}

/// 驱动状态迁移的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchActor {
    Requester,
    DonationOwner,
}

/// 一条合法迁移
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// `None` 表示创建
    pub from: Option<MatchStatus>,
    pub to: MatchStatus,
    pub actor: MatchActor,
    /// 触发该迁移的按钮文案
    pub action: &'static str,
}

/// 迁移表：没有任何迁移会回退
pub const MATCH_TRANSITIONS: [Transition; 5] = [
    Transition {
        from: None,
        to: MatchStatus::Pending,
        actor: MatchActor::Requester,
        action: "Solicitar",
    },
    Transition {
        from: Some(MatchStatus::Pending),
        to: MatchStatus::Approved,
        actor: MatchActor::DonationOwner,
        action: "Aprovar",
    },
    Transition {
        from: Some(MatchStatus::Pending),
        to: MatchStatus::Rejected,
        actor: MatchActor::DonationOwner,
        action: "Rejeitar",
    },
    Transition {
        from: Some(MatchStatus::Approved),
        to: MatchStatus::InProgress,
        actor: MatchActor::DonationOwner,
        action: "Agendar retirada",
    },
    Transition {
        from: Some(MatchStatus::InProgress),
        to: MatchStatus::Completed,
        actor: MatchActor::DonationOwner,
        action: "Marcar como concluída",
    },
];

const MATCH_STATUS_DISPLAY: [(MatchStatus, StatusDisplay); 5] = [
    (MatchStatus::Pending, StatusDisplay::new("Aguardando", StatusTone::Warn)),
    (MatchStatus::Approved, StatusDisplay::new("Aprovada", StatusTone::Primary)),
    (MatchStatus::Rejected, StatusDisplay::new("Rejeitada", StatusTone::Neutral)),
    (MatchStatus::InProgress, StatusDisplay::new("Em andamento", StatusTone::Warn)),
    (MatchStatus::Completed, StatusDisplay::new("Concluída", StatusTone::Accent)),
];

impl MatchStatus {
    pub const INITIAL: MatchStatus = MatchStatus::Pending;

    /// 从当前状态出发的合法迁移
    pub fn transitions(self) -> impl Iterator<Item = &'static Transition> {
        MATCH_TRANSITIONS
            .iter()
            .filter(move |t| t.from == Some(self))
    }

    /// 从当前状态可以到达的下一状态
    pub fn next_statuses(self) -> impl Iterator<Item = MatchStatus> {
        self.transitions().map(|t| t.to)
    }

    pub fn can_transition_to(self, next: MatchStatus) -> bool {
        self.next_statuses().any(|s| s == next)
    }

    /// 终态：没有任何出边（REJECTED / COMPLETED）
    pub fn is_terminal(self) -> bool {
        self != MatchStatus::Unknown && self.transitions().next().is_none()
    }

    /// 校验迁移，非法迁移返回错误且不应发送到后端
    pub fn validate_transition(self, next: MatchStatus) -> Result<&'static Transition, TransitionError> {
        self.transitions()
            .find(|t| t.to == next)
            .ok_or(TransitionError { from: self, to: next })
    }

    pub fn display(self) -> StatusDisplay {
        MATCH_STATUS_DISPLAY
            .iter()
            .find(|(s, _)| *s == self)
            .map(|(_, d)| *d)
            .unwrap_or(UNKNOWN_DISPLAY)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Pending => "PENDING",
            MatchStatus::Approved => "APPROVED",
            MatchStatus::Rejected => "REJECTED",
            MatchStatus::InProgress => "IN_PROGRESS",
            MatchStatus::Completed => "COMPLETED",
            MatchStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 非法的状态迁移
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    pub from: MatchStatus,
    pub to: MatchStatus,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transição inválida: {} → {}",
            self.from.display().label,
            self.to.display().label
        )
    }
}

impl std::error::Error for TransitionError {}

// =========================================================
// Donation 状态
// =========================================================

/// 捐赠状态，由后端作为 Match 迁移的副作用更新，客户端只展示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationStatus {
    Available,
    Reserved,
    Pending,
    Completed,
    Expired,
    Cancelled,
    #[default]
    #[serde(other)]
    Unknown,
}

const DONATION_STATUS_DISPLAY: [(DonationStatus, StatusDisplay); 6] = [
    (DonationStatus::Available, StatusDisplay::new("Disponível", StatusTone::Primary)),
    (DonationStatus::Reserved, StatusDisplay::new("Em andamento", StatusTone::Warn)),
    (DonationStatus::Pending, StatusDisplay::new("Em andamento", StatusTone::Warn)),
    (DonationStatus::Completed, StatusDisplay::new("Concluída", StatusTone::Accent)),
    (DonationStatus::Expired, StatusDisplay::new("Expirada", StatusTone::Neutral)),
    (DonationStatus::Cancelled, StatusDisplay::new("Cancelada", StatusTone::Neutral)),
];

impl DonationStatus {
    pub fn display(self) -> StatusDisplay {
        DONATION_STATUS_DISPLAY
            .iter()
            .find(|(s, _)| *s == self)
            .map(|(_, d)| *d)
            .unwrap_or(UNKNOWN_DISPLAY)
    }

    /// 只有 AVAILABLE 可被编辑或删除
    pub fn is_editable(self) -> bool {
        self == DonationStatus::Available
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DonationStatus::Available => "AVAILABLE",
            DonationStatus::Reserved => "RESERVED",
            DonationStatus::Pending => "PENDING",
            DonationStatus::Completed => "COMPLETED",
            DonationStatus::Expired => "EXPIRED",
            DonationStatus::Cancelled => "CANCELLED",
            DonationStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
