pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// A single boolean output (brake, select, or a direction line used as plain GPIO).
pub trait OutputLine {
    fn write(&mut self, high: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    fn set_high(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.write(true)
    }

    fn set_low(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.write(false)
    }
}

/// A PWM-capable direction output. `stop()` must leave the line low.
pub trait PwmOutput {
    fn configure(
        &mut self,
        frequency_hz: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn start(&mut self, duty_percent: f64) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Half-duplex 3-byte transfer to the potentiometer ADC.
pub trait FeedbackBus {
    fn transfer(
        &mut self,
        frame: [u8; 3],
    ) -> Result<[u8; 3], Box<dyn std::error::Error + Send + Sync>>;

    /// Release the underlying bus handle. Further transfers may fail.
    fn release(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: OutputLine + ?Sized> OutputLine for Box<T> {
    fn write(&mut self, high: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).write(high)
    }
}

impl<T: PwmOutput + ?Sized> PwmOutput for Box<T> {
    fn configure(
        &mut self,
        frequency_hz: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).configure(frequency_hz)
    }
    fn start(&mut self, duty_percent: f64) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).start(duty_percent)
    }
    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).stop()
    }
}

impl<T: FeedbackBus + ?Sized> FeedbackBus for Box<T> {
    fn transfer(
        &mut self,
        frame: [u8; 3],
    ) -> Result<[u8; 3], Box<dyn std::error::Error + Send + Sync>> {
        (**self).transfer(frame)
    }
    fn release(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).release()
    }
}
