//! 时钟抽象
//!
//! 浏览器中读取 `Date.now()`；测试中使用可拨动的 `FixedClock`。

use donamatch_shared::date::Timestamp;

#[cfg(test)]
use std::{cell::Cell, rc::Rc};

pub trait Clock {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(js_sys::Date::now() as i64)
    }
}

#[cfg(test)]
#[derive(Clone)]
pub struct FixedClock {
    now: Rc<Cell<Timestamp>>,
}

#[cfg(test)]
impl FixedClock {
    pub fn at_secs(secs: i64) -> Self {
        Self {
            now: Rc::new(Cell::new(Timestamp::from_secs(secs))),
        }
    }

    pub fn advance(&self, duration: std::time::Duration) {
        self.now.set(self.now.get() + duration);
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}
