//! Scoped commands
//!
//! Begin/end pairs whose closing line is written no matter how the wrapped
//! work finishes: normal return, error, or panic.

use std::ops::{Deref, DerefMut};

use tracing::warn;
use uuid::Uuid;
use wfcmd_protocol::Command;

use crate::emitter::Emitter;
use crate::error::EmitResult;

/// Fresh opaque token for `stop-commands`.
pub fn generate_token() -> String {
    Uuid::new_v4().to_string()
}

/// Open log group; writes `::endgroup::` on [`end`](Self::end) or drop.
pub struct GroupGuard<'a> {
    emitter: &'a mut Emitter,
    use_subprocess: Option<bool>,
    open: bool,
}

impl GroupGuard<'_> {
    /// Close the group, reporting a failed write.
    pub fn end(mut self) -> EmitResult<()> {
        self.open = false;
        self.emitter.end_group(self.use_subprocess)
    }
}

impl Deref for GroupGuard<'_> {
    type Target = Emitter;

    fn deref(&self) -> &Emitter {
        &*self.emitter
    }
}

impl DerefMut for GroupGuard<'_> {
    fn deref_mut(&mut self) -> &mut Emitter {
        &mut *self.emitter
    }
}

impl Drop for GroupGuard<'_> {
    fn drop(&mut self) {
        if self.open {
            if let Err(e) = self.emitter.end_group(self.use_subprocess) {
                warn!(error = %e, "Failed to close group");
            }
        }
    }
}

/// Suspended command processing; writes `::{token}::` on end or drop.
pub struct StopCommandsGuard<'a> {
    emitter: &'a mut Emitter,
    token: String,
    use_subprocess: Option<bool>,
    open: bool,
}

impl StopCommandsGuard<'_> {
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Resume command processing, reporting a failed write.
    pub fn end(mut self) -> EmitResult<()> {
        self.open = false;
        let resume = Command::resume_commands(self.token.as_str());
        self.emitter.emit(&resume, self.use_subprocess)
    }
}

impl Deref for StopCommandsGuard<'_> {
    type Target = Emitter;

    fn deref(&self) -> &Emitter {
        &*self.emitter
    }
}

impl DerefMut for StopCommandsGuard<'_> {
    fn deref_mut(&mut self) -> &mut Emitter {
        &mut *self.emitter
    }
}

impl Drop for StopCommandsGuard<'_> {
    fn drop(&mut self) {
        if self.open {
            let resume = Command::resume_commands(self.token.as_str());
            if let Err(e) = self.emitter.emit(&resume, self.use_subprocess) {
                warn!(error = %e, token = %self.token, "Failed to resume commands");
            }
        }
    }
}

// Begin and end lines of a scoped command share the caller's
// `use_subprocess` choice.
impl Emitter {
    /// Write `::group::{title}` and return a guard that closes it.
    pub fn begin_group(
        &mut self,
        title: &str,
        use_subprocess: Option<bool>,
    ) -> EmitResult<GroupGuard<'_>> {
        self.start_group(title, use_subprocess)?;
        Ok(GroupGuard {
            emitter: self,
            use_subprocess,
            open: true,
        })
    }

    /// Run `f` inside a collapsible log group.
    pub fn group<T>(
        &mut self,
        title: &str,
        use_subprocess: Option<bool>,
        f: impl FnOnce(&mut Emitter) -> T,
    ) -> EmitResult<T> {
        let mut guard = self.begin_group(title, use_subprocess)?;
        let out = f(&mut *guard);
        guard.end()?;
        Ok(out)
    }

    /// Stop command processing until the returned guard ends.
    ///
    /// An empty or absent token is replaced by a generated one.
    pub fn begin_stop_commands(
        &mut self,
        token: Option<&str>,
        use_subprocess: Option<bool>,
    ) -> EmitResult<StopCommandsGuard<'_>> {
        let token = match token {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => generate_token(),
        };

        self.emit(&Command::stop_commands(token.as_str()), use_subprocess)?;
        Ok(StopCommandsGuard {
            emitter: self,
            token,
            use_subprocess,
            open: true,
        })
    }

    /// Run `f` with command processing stopped; `f` receives the token in use.
    pub fn stop_commands<T>(
        &mut self,
        token: Option<&str>,
        use_subprocess: Option<bool>,
        f: impl FnOnce(&mut Emitter, &str) -> T,
    ) -> EmitResult<T> {
        let mut guard = self.begin_stop_commands(token, use_subprocess)?;
        let token = guard.token().to_string();
        let out = f(&mut *guard, &token);
        guard.end()?;
        Ok(out)
    }
}
