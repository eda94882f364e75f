use std::time::Duration;

use crate::{
    event::*,
    event_log::{self, LogEvent, WithOffset},
    timeline::ScenarioId,
};
use anyhow::Result;

#[tokio::test]
async fn event_logs_sanity_check() -> Result<()> {
    let (event_writer, event_reader) = event_log::new_in_memory_shared();

    let start_offset = event_reader.get_start_offset()?;

    assert_eq!(
        event_reader.read(start_offset, 0, Some(Duration::from_secs(0))).await?,
        WithOffset {
            offset: start_offset,
            data: vec![]
        }
    );

    assert_eq!(
        event_reader.read(start_offset, 1, None).await?,
        WithOffset {
            offset: start_offset,
            data: vec![]
        }
    );

    let inserted_offset = event_writer.write(&[Event::Reset])?;

    assert_eq!(
        event_reader.read(inserted_offset, 1, None).await?,
        WithOffset {
            offset: inserted_offset,
            data: vec![]
        }
    );

    assert_eq!(
        event_reader.read(start_offset, 1, None).await?,
        WithOffset {
            offset: inserted_offset,
            data: vec![LogEvent {
                offset: start_offset,
                details: Event::Reset
            }]
        }
    );

    Ok(())
}

#[tokio::test]
async fn reads_respect_offset_and_limit() -> Result<()> {
    let (event_writer, event_reader) = event_log::new_in_memory_shared();

    event_writer.write(&[
        Event::RunStarted { run: 1 },
        Event::StageEntered { run: 1, stage: 0 },
    ])?;
    event_writer.write(&[Event::RunFinished { run: 1 }])?;

    let first = event_reader.read(0, 2, None).await?;
    assert_eq!(first.offset, 2);
    assert_eq!(
        first.data.iter().map(|e| e.offset).collect::<Vec<_>>(),
        vec![0, 1]
    );

    let rest = event_reader.read(first.offset, 10, None).await?;
    assert_eq!(
        rest,
        WithOffset {
            offset: 3,
            data: vec![LogEvent {
                offset: 2,
                details: Event::RunFinished { run: 1 }
            }]
        }
    );

    Ok(())
}

#[tokio::test]
async fn reading_past_the_end_fails() -> Result<()> {
    let (_event_writer, event_reader) = event_log::new_in_memory_shared();

    assert!(event_reader.read(5, 1, None).await.is_err());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn blocked_read_wakes_up_on_write() -> Result<()> {
    let (event_writer, event_reader) = event_log::new_in_memory_shared();

    let reader = tokio::spawn({
        let event_reader = event_reader.clone();
        async move { event_reader.read(0, 10, Some(Duration::from_secs(10))).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    event_writer.write(&[Event::ScenarioSelected {
        scenario: ScenarioId::Data,
    }])?;

    let res = reader.await??;
    assert_eq!(res.offset, 1);
    assert_eq!(
        res.data[0].details,
        Event::ScenarioSelected {
            scenario: ScenarioId::Data
        }
    );

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn blocked_read_times_out_empty() -> Result<()> {
    let (_event_writer, event_reader) = event_log::new_in_memory_shared();

    let res = event_reader.read(0, 10, Some(Duration::from_secs(1))).await?;
    assert_eq!(
        res,
        WithOffset {
            offset: 0,
            data: vec![]
        }
    );

    Ok(())
}

#[tokio::test]
async fn old_events_are_dropped_past_capacity() -> Result<()> {
    let (event_writer, event_reader) = event_log::new_in_memory_shared_with_capacity(3);

    for run in 0..5 {
        event_writer.write(&[Event::RunStarted { run }])?;
    }

    assert_eq!(event_reader.get_start_offset()?, 2);
    assert!(event_reader.read(0, 10, None).await.is_err());
    assert!(event_reader.read(1, 10, None).await.is_err());

    let res = event_reader.read(2, 10, None).await?;
    assert_eq!(res.offset, 5);
    assert_eq!(
        res.data,
        (2..5)
            .map(|run| LogEvent {
                offset: run,
                details: Event::RunStarted { run }
            })
            .collect::<Vec<_>>()
    );

    // one write larger than the whole log keeps its tail
    let end = event_writer.write(&[Event::Reset, Event::Reset, Event::Reset, Event::Reset])?;
    assert_eq!(end, 9);
    assert_eq!(event_reader.get_start_offset()?, 6);
    assert_eq!(event_reader.read(6, 10, None).await?.data.len(), 3);

    Ok(())
}
