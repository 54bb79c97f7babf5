//! 表单状态管理模块
//!
//! 将零散的 signal 整合为 `FormState` 结构体，负责：
//! - 数据的持有
//! - 数据的重置
//! - 数据到请求对象的转换（校验由 [`DonationForm`] 完成）

use donamatch_shared::DonationRequest;
use leptos::prelude::*;

use crate::forms::{DonationForm, FieldErrors};

/// 表单状态结构体
///
/// 使用 `RwSignal` 因为它实现了 `Copy` trait，非常适合作为 Props 在组件间传递。
#[derive(Clone, Copy)]
pub struct FormState {
    // 物品信息
    pub title: RwSignal<String>,
    pub description: RwSignal<String>,
    pub category: RwSignal<String>,
    pub condition: RwSignal<String>,
    pub quantity: RwSignal<String>,

    // 取货信息
    pub location: RwSignal<String>,
    pub city: RwSignal<String>,
    pub state: RwSignal<String>,
    pub zip_code: RwSignal<String>,
    pub pickup_instructions: RwSignal<String>,
    pub expires_at: RwSignal<String>,

    /// 最近一次提交的校验结果
    pub errors: RwSignal<FieldErrors>,
}

impl FormState {
    /// 创建新的表单状态，所有字段使用默认值
    pub fn new() -> Self {
        let defaults = DonationForm::default();
        Self {
            title: RwSignal::new(defaults.title),
            description: RwSignal::new(defaults.description),
            category: RwSignal::new(defaults.category),
            condition: RwSignal::new(defaults.condition),
            quantity: RwSignal::new(defaults.quantity),
            location: RwSignal::new(defaults.location),
            city: RwSignal::new(defaults.city),
            state: RwSignal::new(defaults.state),
            zip_code: RwSignal::new(defaults.zip_code),
            pickup_instructions: RwSignal::new(defaults.pickup_instructions),
            expires_at: RwSignal::new(defaults.expires_at),
            errors: RwSignal::new(FieldErrors::default()),
        }
    }

    /// 重置表单到初始状态
    pub fn reset(&self) {
        let defaults = DonationForm::default();
        self.title.set(defaults.title);
        self.description.set(defaults.description);
        self.category.set(defaults.category);
        self.condition.set(defaults.condition);
        self.quantity.set(defaults.quantity);
        self.location.set(defaults.location);
        self.city.set(defaults.city);
        self.state.set(defaults.state);
        self.zip_code.set(defaults.zip_code);
        self.pickup_instructions.set(defaults.pickup_instructions);
        self.expires_at.set(defaults.expires_at);
        self.errors.set(FieldErrors::default());
    }

    /// 当前输入的快照
    pub fn snapshot(&self) -> DonationForm {
        DonationForm {
            title: self.title.get_untracked(),
            description: self.description.get_untracked(),
            category: self.category.get_untracked(),
            condition: self.condition.get_untracked(),
            quantity: self.quantity.get_untracked(),
            location: self.location.get_untracked(),
            city: self.city.get_untracked(),
            state: self.state.get_untracked(),
            zip_code: self.zip_code.get_untracked(),
            pickup_instructions: self.pickup_instructions.get_untracked(),
            expires_at: self.expires_at.get_untracked(),
        }
    }

    /// 校验并转换为 API 请求对象，错误写入 `errors`
    pub fn to_request(&self) -> Option<DonationRequest> {
        match self.snapshot().to_request() {
            Ok(request) => {
                self.errors.set(FieldErrors::default());
                Some(request)
            }
            Err(errors) => {
                self.errors.set(errors);
                None
            }
        }
    }

    /// 某个字段的错误信号
    pub fn error(&self, field: &'static str) -> Signal<Option<String>> {
        let errors = self.errors;
        Signal::derive(move || errors.with(|e| e.get(field).map(String::from)))
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}
