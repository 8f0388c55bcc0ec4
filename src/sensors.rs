use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TemperatureSensor: Send + Sync {
    /// Reads the current temperature in °C.
    async fn read_temperature(&self) -> Result<f32>;
    fn key(&self) -> String;
}
