#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fii_dividends::models::Ticker;
use fii_dividends::services::browser::{BrowserLauncher, BrowserPage, BrowserSession, Result};
use fii_dividends::services::cache::CacheStore;

/// What the fake browser does when a tab navigates to a ticker's page.
#[derive(Debug, Clone)]
pub enum PageScript {
    Html(String),
    NavigationError(String),
    /// Navigation never completes.
    Hang,
    /// `#earning-section` never appears.
    NoEarningSection,
}

#[derive(Debug, Default)]
pub struct BrowserLog {
    pub launches: usize,
    pub pages_opened: usize,
    pub pages_closed: usize,
    pub visited: Vec<String>,
    /// Per-tab calls in order: `stealth`, `goto <url>`.
    pub events: Vec<String>,
    pub closed: bool,
    pub killed: bool,
}

#[derive(Clone, Default)]
pub struct FakeLauncher {
    scripts: Arc<HashMap<String, PageScript>>,
    log: Arc<Mutex<BrowserLog>>,
    fail_launch: bool,
    fail_close: bool,
    fail_stealth: bool,
}

impl FakeLauncher {
    pub fn new(scripts: Vec<(&str, PageScript)>) -> Self {
        FakeLauncher {
            scripts: Arc::new(
                scripts
                    .into_iter()
                    .map(|(ticker, script)| (ticker.to_string(), script))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    pub fn failing_launch() -> Self {
        FakeLauncher {
            fail_launch: true,
            ..Default::default()
        }
    }

    pub fn with_stuck_shutdown(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn with_failing_stealth(mut self) -> Self {
        self.fail_stealth = true;
        self
    }

    pub fn log(&self) -> std::sync::MutexGuard<'_, BrowserLog> {
        self.log.lock().unwrap()
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        if self.fail_launch {
            return Err("Could not find Chrome executable".into());
        }
        self.log().launches += 1;
        Ok(Box::new(FakeSession {
            launcher: self.clone(),
        }))
    }
}

struct FakeSession {
    launcher: FakeLauncher,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>> {
        self.launcher.log().pages_opened += 1;
        Ok(Box::new(FakePage {
            launcher: self.launcher.clone(),
            script: Mutex::new(None),
        }))
    }

    async fn close(&mut self) -> Result<()> {
        if self.launcher.fail_close {
            return Err("Chrome did not exit within 5s".into());
        }
        self.launcher.log().closed = true;
        Ok(())
    }

    async fn kill(&mut self) -> Result<()> {
        self.launcher.log().killed = true;
        Ok(())
    }
}

struct FakePage {
    launcher: FakeLauncher,
    script: Mutex<Option<PageScript>>,
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn enable_stealth(&self) -> Result<()> {
        self.launcher.log().events.push("stealth".to_string());
        if self.launcher.fail_stealth {
            return Err("Page.addScriptToEvaluateOnNewDocument failed".into());
        }
        Ok(())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        {
            let mut log = self.launcher.log();
            log.visited.push(url.to_string());
            log.events.push(format!("goto {}", url));
        }
        let ticker = url.rsplit('/').next().unwrap_or_default();
        let script = self
            .launcher
            .scripts
            .get(ticker)
            .cloned()
            .unwrap_or(PageScript::NavigationError("net::ERR_NAME_NOT_RESOLVED".to_string()));

        match &script {
            PageScript::NavigationError(e) => return Err(e.clone().into()),
            PageScript::Hang => std::future::pending::<()>().await,
            _ => {}
        }
        *self.script.lock().unwrap() = Some(script);
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let script = self.script.lock().unwrap().clone();
        match script {
            Some(PageScript::NoEarningSection) => {
                tokio::time::sleep(timeout).await;
                Err(format!("Timed out after {:?} waiting for '{}'", timeout, selector).into())
            }
            _ => Ok(()),
        }
    }

    async fn content(&self) -> Result<String> {
        let script = self.script.lock().unwrap().clone();
        match script {
            Some(PageScript::Html(html)) => Ok(html),
            _ => Ok("<html><body></body></html>".to_string()),
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.launcher.log().pages_closed += 1;
        Ok(())
    }
}

/// Store whose writes fail for some keys and whose reads can fail entirely.
#[derive(Default)]
pub struct FailingStore {
    pub failing_writes: HashSet<String>,
    pub fail_reads: bool,
    pub inner: fii_dividends::services::cache::MemoryStore,
}

#[async_trait]
impl CacheStore for FailingStore {
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        if self.failing_writes.contains(key) {
            return Err(format!("READONLY You can't write against a read only replica ({})", key).into());
        }
        self.inner.set_ex(key, value, ttl_secs).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads {
            return Err("Connection refused (os error 111)".into());
        }
        self.inner.get(key).await
    }
}

pub fn ticker(code: &str) -> Ticker {
    Ticker::parse(code).unwrap()
}

/// Status Invest style earnings page with the given (DATA COM, PAGAMENTO, VALOR) rows.
pub fn earnings_page(rows: &[(&str, &str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(com, pgto, valor)| {
            format!(
                "<tr><td>Rendimento</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                com, pgto, valor
            )
        })
        .collect();
    format!(
        r#"<html><body><div id="earning-section"><div class="table-responsive"><table>
        <thead><tr><th>TIPO</th><th>DATA COM</th><th>PAGAMENTO</th><th>VALOR</th></tr></thead>
        <tbody>{}</tbody></table></div></div></body></html>"#,
        body
    )
}
