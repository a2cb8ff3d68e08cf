//! Live backend over the Chrome DevTools Protocol.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Handler, Page};
use futures::StreamExt;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use super::session::{ElementInfo, PageSession, SessionError, SessionFactory};

const SELECTOR_POLL: Duration = Duration::from_millis(100);

/// Selector matches across open shadow roots, in document order.
const DEEP_QUERY: &str = r#"const deepQuery = (selector) => {
    const found = [];
    const visit = (root) => {
        for (const el of root.querySelectorAll(selector)) found.push(el);
        for (const el of root.querySelectorAll('*')) if (el.shadowRoot) visit(el.shadowRoot);
    };
    visit(document);
    return found;
};"#;

/// Serialises the DOM with open shadow roots inlined as declarative
/// templates so a static parser sees the composed tree.
const SNAPSHOT: &str = r#"() => {
    const voids = new Set(['area','base','br','col','embed','hr','img','input','link','meta','source','track','wbr']);
    const raw = new Set(['script','style']);
    const text = (s) => s.replace(/&/g, '&amp;').replace(/</g, '&lt;').replace(/>/g, '&gt;');
    const quote = (s) => s.replace(/&/g, '&amp;').replace(/"/g, '&quot;');
    const walk = (node) => {
        if (node.nodeType === Node.TEXT_NODE) {
            const parent = node.parentNode;
            return parent && raw.has(parent.localName) ? node.textContent : text(node.textContent);
        }
        if (node.nodeType !== Node.ELEMENT_NODE) return '';
        const tag = node.localName;
        let out = '<' + tag;
        for (const a of node.attributes) out += ' ' + a.name + '="' + quote(a.value) + '"';
        out += '>';
        if (voids.has(tag)) return out;
        if (node.shadowRoot) {
            out += '<template shadowrootmode="open">';
            for (const child of node.shadowRoot.childNodes) out += walk(child);
            out += '</template>';
        }
        const children = tag === 'template' ? node.content.childNodes : node.childNodes;
        for (const child of children) out += walk(child);
        return out + '</' + tag + '>';
    };
    return '<!DOCTYPE html>' + walk(document.documentElement);
}"#;

/// One tab in a shared headless browser.
#[derive(Debug)]
pub struct ChromeSession {
    page: Page,
    /// Set once the whole browser is gone.
    closed: Arc<AtomicBool>,
    tab_closed: AtomicBool,
}

impl ChromeSession {
    async fn eval<T: serde::de::DeserializeOwned>(&self, expression: String) -> Result<T, SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        self.page
            .evaluate(expression)
            .await
            .map_err(|e| SessionError::Browser(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| SessionError::Browser(e.to_string()))
    }

    async fn count(&self, selector: &str) -> Result<usize, SessionError> {
        let selector = json!(selector);
        self.eval(format!("(() => {{ {DEEP_QUERY} return deepQuery({selector}).length; }})()"))
            .await
    }
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        self.page
            .goto(url)
            .await
            .map_err(|e| SessionError::Browser(e.to_string()))?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool, SessionError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.count(selector).await? > 0 {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(SELECTOR_POLL).await;
        }
    }

    async fn evaluate(&self, script: &str, args: Value) -> Result<Value, SessionError> {
        self.eval(format!("({script})({args})")).await
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ElementInfo>, SessionError> {
        let selector = json!(selector);
        self.eval(format!(
            r#"(() => {{ {DEEP_QUERY}
                return deepQuery({selector}).map((el, index) => {{
                    const rect = el.getBoundingClientRect();
                    const style = window.getComputedStyle(el);
                    return {{
                        index,
                        text: (el.innerText || el.textContent || '').trim(),
                        visible: rect.width > 0 && rect.height > 0
                            && style.visibility !== 'hidden' && style.display !== 'none',
                        href: el.href || el.getAttribute('href'),
                        title: el.getAttribute('title'),
                    }};
                }});
            }})()"#
        ))
        .await
    }

    async fn click(&self, selector: &str, index: usize) -> Result<(), SessionError> {
        let quoted = json!(selector);
        let clicked: bool = self
            .eval(format!(
                "(() => {{ {DEEP_QUERY} const el = deepQuery({quoted})[{index}]; if (!el) return false; el.click(); return true; }})()"
            ))
            .await?;
        if !clicked {
            return Err(SessionError::NoSuchElement {
                selector: selector.to_string(),
                index,
            });
        }
        Ok(())
    }

    async fn snapshot(&self) -> Result<String, SessionError> {
        self.eval(format!("({SNAPSHOT})()")).await
    }

    async fn close(&self) -> Result<(), SessionError> {
        if self.tab_closed.swap(true, Ordering::SeqCst) || self.closed.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| SessionError::Browser(e.to_string()))?;
        debug!("tab closed");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.tab_closed.load(Ordering::SeqCst)
    }
}

/// Owns the browser process; each [`SessionFactory::open`] opens a new tab.
pub struct ChromeSessionFactory {
    browser: Browser,
    closed: Arc<AtomicBool>,
    handler_task: JoinHandle<()>,
}

impl ChromeSessionFactory {
    pub async fn launch() -> Result<Self, SessionError> {
        let config = BrowserConfig::builder().build().map_err(SessionError::Browser)?;
        let (browser, handler) = Browser::launch(config)
            .await
            .map_err(|e| SessionError::Browser(e.to_string()))?;

        let closed = Arc::new(AtomicBool::new(false));
        let handler_task = spawn_handler(handler, Arc::clone(&closed));
        debug!("headless browser launched");

        Ok(Self {
            browser,
            closed,
            handler_task,
        })
    }
}

impl Drop for ChromeSessionFactory {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

#[async_trait]
impl SessionFactory for ChromeSessionFactory {
    type Session = ChromeSession;

    async fn open(&self) -> Result<ChromeSession, SessionError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SessionError::Closed);
        }
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::Browser(e.to_string()))?;
        Ok(ChromeSession {
            page,
            closed: Arc::clone(&self.closed),
            tab_closed: AtomicBool::new(false),
        })
    }
}

fn spawn_handler(mut handler: Handler, closed: Arc<AtomicBool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                warn!(error = %e, "browser handler event error");
            }
        }
        closed.store(true, Ordering::SeqCst);
    })
}
