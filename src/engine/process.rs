//! A running engine process whose stdout and stderr are merged into one
//! line channel.

use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};

pub struct EngineProcess {
    child: Child,
    lines: Receiver<String>,
    grace: Duration,
}

impl EngineProcess {
    /// Spawn `command` with both output streams piped into the line channel.
    pub fn spawn(mut command: Command, grace: Duration) -> io::Result<Self> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = command.spawn()?;

        let (tx, rx) = unbounded::<String>();
        if let Some(stdout) = child.stdout.take() {
            spawn_reader(stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader(stderr, tx);
        }

        Ok(Self {
            child,
            lines: rx,
            grace,
        })
    }

    /// Lines from both streams. Disconnects once both streams hit EOF.
    pub fn lines(&self) -> &Receiver<String> {
        &self.lines
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    /// Stop the process: ask politely, wait up to the grace period, then kill.
    /// Does nothing if the process has already exited.
    pub fn terminate(&mut self) -> io::Result<()> {
        if self.child.try_wait()?.is_some() {
            return Ok(());
        }

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;
            use std::time::Instant;

            if let Err(e) = kill(Pid::from_raw(self.child.id() as i32), Signal::SIGTERM) {
                log::debug!("SIGTERM to engine {} failed: {}", self.child.id(), e);
            }
            let deadline = Instant::now() + self.grace;
            while Instant::now() < deadline {
                if self.child.try_wait()?.is_some() {
                    return Ok(());
                }
                thread::sleep(Duration::from_millis(20));
            }
        }

        log::debug!(
            "Engine {} still running after {:?}, killing",
            self.child.id(),
            self.grace
        );
        match self.child.kill() {
            Ok(()) => {}
            // Exited between the last poll and the kill
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => {}
            Err(e) => return Err(e),
        }
        self.child.wait()?;
        Ok(())
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        if let Err(e) = self.terminate() {
            log::warn!("Failed to stop engine process {}: {}", self.child.id(), e);
        }
    }
}

/// Forward lines from `stream` until EOF or until nobody is listening.
/// Invalid UTF-8 is replaced rather than ending the stream.
fn spawn_reader<R: Read + Send + 'static>(stream: R, tx: Sender<String>) {
    thread::spawn(move || {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf)
                        .trim_end_matches(['\r', '\n'])
                        .to_string();
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::debug!("Engine output stream closed: {}", e);
                    break;
                }
            }
        }
    });
}
