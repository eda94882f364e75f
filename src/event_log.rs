//! Player event log
//!
//! Record of everything the player applied, readable by offset. Only the
//! most recent events are retained.
//! The HTTP surface long-polls it; tests replay it to check ordering.
mod in_memory;

pub use self::in_memory::*;

use crate::event::Event;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::{sync::Arc, time::Duration};

pub type Offset = u64;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogEvent {
    pub offset: Offset,
    pub details: Event,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WithOffset<T> {
    pub offset: Offset,
    pub data: T,
}

#[async_trait]
pub trait Reader {
    /// Read up to `limit` events starting at `offset`
    ///
    /// If nothing is available yet and `timeout` is set, wait up to `timeout`
    /// for a writer. The returned offset is where the next read should start.
    async fn read(
        &self,
        offset: Offset,
        limit: usize,
        timeout: Option<Duration>,
    ) -> Result<WithOffset<Vec<LogEvent>>>;

    fn get_start_offset(&self) -> Result<Offset>;
}

pub trait Writer {
    fn write(&self, events: &[Event]) -> Result<Offset>;
}

pub type SharedReader = Arc<dyn Reader + Sync + Send + 'static>;
pub type SharedWriter = Arc<dyn Writer + Sync + Send + 'static>;
