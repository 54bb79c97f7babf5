//! LocalStorage 封装模块
//!
//! 基于 `gloo-storage` 实现 [`KeyValueStore`]，测试中以 `MemoryStorage` 替换。

use gloo_storage::{LocalStorage, Storage};

#[cfg(test)]
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// 持久化键值存储
///
/// 写入/删除返回是否成功（浏览器可能禁用存储或配额已满）。
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> bool;
    fn remove(&self, key: &str) -> bool;
}

/// 浏览器 LocalStorage
///
/// 值按原样保存（不做 JSON 包装），与其他读取同一存储的页面保持兼容。
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> bool {
        LocalStorage::raw().set_item(key, value).is_ok()
    }

    fn remove(&self, key: &str) -> bool {
        LocalStorage::raw().remove_item(key).is_ok()
    }
}

// =========================================================
// 测试工具: MemoryStorage
// =========================================================

/// 内存存储，克隆后共享同一份数据，便于在测试中观察写入结果
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemoryStorage {
    data: Rc<RefCell<HashMap<String, String>>>,
    // 对这些键的写入会失败
    failing_keys: Rc<RefCell<Vec<String>>>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes_to(&self, key: &str) {
        self.failing_keys.borrow_mut().push(key.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.borrow().contains_key(key)
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.data.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        if self.failing_keys.borrow().iter().any(|k| k == key) {
            return false;
        }
        self.data
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn remove(&self, key: &str) -> bool {
        self.data.borrow_mut().remove(key);
        true
    }
}
