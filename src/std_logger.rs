use chrono::Local;
use log::{max_level, Metadata, Record};

pub struct StdLogger {
  app: &'static str,
}

impl StdLogger {
  pub const fn new(app: &'static str) -> StdLogger {
    StdLogger { app }
  }
}

impl log::Log for StdLogger {
  fn enabled(&self, metadata: &Metadata) -> bool {
    metadata.level() <= max_level()
  }

  fn log(&self, record: &Record) {
    if self.enabled(record.metadata()) {
      let time_str = Local::now().format("%Y-%m-%dT%H:%M:%S");
      println!("{0} {1:<8} {2}: {3}", time_str, record.level(), self.app, record.args())
    }
  }

  fn flush(&self) {}
}
