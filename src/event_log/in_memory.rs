use super::*;
use anyhow::format_err;
use parking_lot::RwLock;
use std::collections::VecDeque;
use tokio::sync::Notify;

/// A full canned run records about 20 events
pub const DEFAULT_RETAINED_EVENTS: usize = 4096;

struct InMemoryLogInner {
    /// Offset of `events[0]`
    first: Offset,
    events: VecDeque<Event>,
}

/// Keeps only the last `capacity` events; older offsets can't be read anymore
pub struct InMemoryLog {
    inner: RwLock<InMemoryLogInner>,
    capacity: usize,
    notify: Notify,
}

impl InMemoryLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(InMemoryLogInner {
                first: 0,
                events: VecDeque::new(),
            }),
            capacity: capacity.max(1),
            notify: Notify::new(),
        }
    }

    fn slice(&self, offset: Offset, limit: usize) -> Result<WithOffset<Vec<LogEvent>>> {
        let read = self.inner.read();

        let skip = offset
            .checked_sub(read.first)
            .ok_or_else(|| format_err!("offset {offset} is no longer retained (oldest is {})", read.first))?;
        let skip = usize::try_from(skip)?;
        if read.events.len() < skip {
            return Err(format_err!("offset {offset} out of bounds"));
        }

        let data: Vec<_> = read
            .events
            .iter()
            .skip(skip)
            .take(limit)
            .zip(offset..)
            .map(|(e, offset)| LogEvent {
                offset,
                details: e.clone(),
            })
            .collect();

        Ok(WithOffset {
            offset: offset + u64::try_from(data.len())?,
            data,
        })
    }
}

impl Default for InMemoryLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_RETAINED_EVENTS)
    }
}

#[async_trait]
impl Reader for InMemoryLog {
    async fn read(
        &self,
        offset: Offset,
        limit: usize,
        timeout: Option<Duration>,
    ) -> Result<WithOffset<Vec<LogEvent>>> {
        let Some(timeout) = timeout else {
            return self.slice(offset, limit);
        };

        // register interest before looking, so a write in between is not missed
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        let res = self.slice(offset, limit)?;
        if !res.data.is_empty() || limit == 0 {
            return Ok(res);
        }

        let _ = tokio::time::timeout(timeout, notified).await;
        self.slice(offset, limit)
    }

    fn get_start_offset(&self) -> Result<Offset> {
        Ok(self.inner.read().first)
    }
}

impl Writer for InMemoryLog {
    fn write(&self, events: &[Event]) -> Result<Offset> {
        let end = {
            let mut write = self.inner.write();
            write.events.extend(events.iter().cloned());

            let excess = write.events.len().saturating_sub(self.capacity);
            if excess > 0 {
                write.events.drain(..excess);
                write.first += u64::try_from(excess)?;
            }

            write.first + u64::try_from(write.events.len())?
        };
        self.notify.notify_waiters();

        Ok(end)
    }
}

#[cfg(test)]
pub fn new_in_memory_shared() -> (SharedWriter, SharedReader) {
    new_in_memory_shared_with_capacity(DEFAULT_RETAINED_EVENTS)
}

pub fn new_in_memory_shared_with_capacity(capacity: usize) -> (SharedWriter, SharedReader) {
    let log = Arc::new(InMemoryLog::with_capacity(capacity));
    (log.clone(), log)
}
