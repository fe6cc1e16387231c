use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use market::{DataSource, FetchError, Sample};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct SourceLog {
    pub polls: usize,
    pub closes: usize,
}

/// Replays a fixed list of poll results. Once the script runs out every
/// poll fails fatally with "script exhausted".
#[derive(Default)]
pub struct ScriptedSource {
    pub script: VecDeque<Result<Vec<Sample>, FetchError>>,
    pub log: Arc<Mutex<SourceLog>>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<Vec<Sample>, FetchError>>) -> Self {
        Self {
            script: script.into(),
            log: Arc::default(),
        }
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    async fn poll(&mut self) -> Result<Vec<Sample>, FetchError> {
        self.log.lock().await.polls += 1;
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Fatal("script exhausted".into())))
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        self.log.lock().await.closes += 1;
        Ok(())
    }
}
