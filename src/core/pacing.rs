use std::io::Write;
use std::time::Duration;

pub const RETRY_COUNTDOWN: &str = "  ...retrying in {sec}s   ";
pub const NEXT_REQUEST_COUNTDOWN: &str = "  ...next request in {sec}s   ";

/// Blocking-style countdown used for rate-limit waits and batch pacing.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    show_progress: bool,
}

impl Default for Pacer {
    fn default() -> Self {
        Self {
            show_progress: true,
        }
    }
}

impl Pacer {
    pub fn quiet() -> Self {
        Self {
            show_progress: false,
        }
    }

    pub fn render(template: &str, sec: u64) -> String {
        template.replace("{sec}", &sec.to_string())
    }

    /// 每秒覆寫同一行進度，結束後換行
    pub async fn countdown(&self, seconds: u64, template: &str) {
        if seconds == 0 {
            return;
        }

        let mut stdout = std::io::stdout();
        for sec in (1..=seconds).rev() {
            if self.show_progress {
                print!("\r{}", Self::render(template, sec));
                let _ = stdout.flush();
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        if self.show_progress {
            println!();
        }
    }
}
