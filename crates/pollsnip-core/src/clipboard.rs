use anyhow::anyhow;
use tracing::debug;

/// Destination for the finished poll text.
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> anyhow::Result<()>;
}

/// The desktop clipboard.
///
/// The handle is opened on first write and kept for the life of the value:
/// on X11 the copied text is only served while its owner is alive. A
/// one-shot clipboard outlives that by blocking each write until another
/// program takes the selection over.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
    wait_for_handoff: bool,
}

impl SystemClipboard {
    /// For long-running callers that keep the value alive.
    pub fn new() -> Self {
        Self::default()
    }

    /// For callers that exit right after copying.
    pub fn one_shot() -> Self {
        Self {
            inner: None,
            wait_for_handoff: true,
        }
    }

    pub fn waits_for_handoff(&self) -> bool {
        self.wait_for_handoff
    }

    fn open(&mut self) -> anyhow::Result<&mut arboard::Clipboard> {
        if self.inner.is_none() {
            let opened = arboard::Clipboard::new().map_err(|e| anyhow!("clipboard unavailable: {e}"))?;
            self.inner = Some(opened);
        }
        self.inner.as_mut().ok_or_else(|| anyhow!("clipboard unavailable"))
    }
}

impl std::fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemClipboard")
            .field("open", &self.inner.is_some())
            .field("wait_for_handoff", &self.wait_for_handoff)
            .finish()
    }
}

#[cfg(target_os = "linux")]
fn set_text_waiting(clipboard: &mut arboard::Clipboard, text: &str) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;

    debug!("waiting for another program to take the clipboard");
    clipboard.set().wait().text(text.to_string())
}

// Other platforms keep the text after the owner exits.
#[cfg(not(target_os = "linux"))]
fn set_text_waiting(clipboard: &mut arboard::Clipboard, text: &str) -> Result<(), arboard::Error> {
    clipboard.set_text(text.to_string())
}

impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> anyhow::Result<()> {
        let wait = self.wait_for_handoff;
        let clipboard = self.open()?;
        let written = if wait {
            set_text_waiting(clipboard, text)
        } else {
            clipboard.set_text(text.to_string())
        };
        written.map_err(|e| anyhow!("failed to set clipboard: {e}"))?;
        debug!(bytes = text.len(), wait, "clipboard written");
        Ok(())
    }
}

/// Keeps the last written text; for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
    pub fail: bool,
}

impl ClipboardSink for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> anyhow::Result<()> {
        if self.fail {
            return Err(anyhow!("clipboard rejected the write"));
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}
