use filter_targets::Targets;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub struct Output {
    stdout: StandardStream,
}

impl Output {
    pub fn new(color: bool) -> Self {
        let color_choice = if color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self {
            stdout: StandardStream::stdout(color_choice),
        }
    }

    fn set_color(&mut self, color: Color) {
        let _ = self.stdout.set_color(ColorSpec::new().set_fg(Some(color)));
    }

    fn set_dim(&mut self) {
        let _ = self.stdout.set_color(ColorSpec::new().set_dimmed(true));
    }

    fn reset(&mut self) {
        let _ = self.stdout.reset();
    }

    /// One target per line: `host` or `host!service`.
    pub fn print_targets(&mut self, targets: &Targets) -> std::io::Result<()> {
        match targets {
            Targets::Hosts(hosts) => {
                for host in hosts {
                    self.print_host(host)?;
                    writeln!(self.stdout)?;
                }
            }
            Targets::Services(services) => {
                for (host, service) in services {
                    self.print_host(host)?;
                    self.set_dim();
                    write!(self.stdout, "!")?;
                    self.set_color(Color::Cyan);
                    write!(self.stdout, "{}", service)?;
                    self.reset();
                    writeln!(self.stdout)?;
                }
            }
        }
        self.stdout.flush()
    }

    fn print_host(&mut self, host: &str) -> std::io::Result<()> {
        self.set_color(Color::Green);
        write!(self.stdout, "{}", host)?;
        self.reset();
        Ok(())
    }

    pub fn print_json(&mut self, targets: &Targets) -> std::io::Result<()> {
        writeln!(self.stdout, "{}", targets_json(targets))?;
        self.stdout.flush()
    }
}

/// Host names as a string array, services as `{"host", "service"}` objects.
pub fn targets_json(targets: &Targets) -> serde_json::Value {
    match targets {
        Targets::Hosts(hosts) => serde_json::json!(hosts),
        Targets::Services(services) => services
            .iter()
            .map(|(host, service)| serde_json::json!({ "host": host, "service": service }))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hosts_json() {
        let targets = Targets::Hosts(vec!["a", "b"]);
        assert_eq!(
            targets_json(&targets).to_string(),
            r#"["a","b"]"#
        );
    }

    #[test]
    fn test_services_json() {
        let targets = Targets::Services(vec![("h", "s")]);
        assert_eq!(
            targets_json(&targets),
            serde_json::json!([{ "host": "h", "service": "s" }])
        );
    }
}
