//! Interactive naming of newly discovered bulbs.

use std::io::{self, BufRead, Write};

use lifxctl_app::ports::DiscoveredLight;
use lifxctl_app::services::discovery::NameResolver;

/// Asks for a name on `output` and reads the answer from `input`.
///
/// An empty answer, end of input or a read error skips the bulb.
pub struct PromptResolver<R, W> {
    input: R,
    output: W,
}

impl PromptResolver<io::StdinLock<'static>, io::Stdout> {
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn prompt(&mut self, light: &DiscoveredLight) -> io::Result<Option<String>> {
        writeln!(self.output, "\nFound new device:")?;
        writeln!(self.output, "MAC Address: {}", light.id)?;
        writeln!(self.output, "IP Address: {}", light.address)?;
        write!(
            self.output,
            "Enter a name for this device (or press Enter to skip): "
        )?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let name = line.trim();
        Ok((!name.is_empty()).then(|| name.to_string()))
    }
}

impl<R: BufRead, W: Write> NameResolver for PromptResolver<R, W> {
    fn resolve(&mut self, light: &DiscoveredLight) -> Option<String> {
        self.prompt(light).unwrap_or_else(|err| {
            tracing::warn!(%err, "cannot read device name");
            None
        })
    }
}
