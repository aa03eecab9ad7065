use core::time::Duration;

/// Configuration settings for the CRIR M1 engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// How long each call waits for the sensor's response.
    pub timeout: Duration,
}

impl Config {
    /// Creates a new `Config` instance.
    ///
    /// # Arguments
    ///
    /// * `timeout` - The response deadline applied to every exchange.
    ///
    /// # Returns
    ///
    /// A new `Config` instance with the specified timeout.
    pub fn new(timeout: Duration) -> Config {
        Config { timeout }
    }

    /// Sets the response deadline for the configuration.
    ///
    /// # Arguments
    ///
    /// * `timeout` - The deadline to apply to every exchange.
    ///
    /// # Returns
    ///
    /// The updated `Config` instance.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for Config {
    /// Returns the default configuration.
    ///
    /// The default response deadline is 5 seconds, which the sensor
    /// answers well within at 9600 baud.
    fn default() -> Config {
        Config {
            timeout: Duration::from_secs(5),
        }
    }
}
