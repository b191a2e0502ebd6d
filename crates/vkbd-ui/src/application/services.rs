//! Application context owning the process-wide keyboard services.
//!
//! The key event bus and the physical key interceptor must each exist at
//! most once.  Rather than hiding them in globals, [`Services`] owns them and
//! hands out shared handles; components that need a service take
//! `&Services` at construction and fail with a [`ConfigurationError`] when
//! the service was never installed.

use std::rc::Rc;

use thiserror::Error;
use tracing::info;

use super::interceptor::{InterceptPolicy, PhysicalKeyInterceptor};
use super::key_bus::KeyEventBus;

const KEY_BUS: &str = "key event bus";
const INTERCEPTOR: &str = "physical key interceptor";

/// Raised when the application context is wired up incorrectly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("the {0} has not been installed")]
    MissingService(&'static str),

    #[error("the {0} is already installed")]
    DuplicateService(&'static str),
}

/// Owner of the single key event bus and physical key interceptor.
#[derive(Default)]
pub struct Services {
    key_bus: Option<Rc<KeyEventBus>>,
    interceptor: Option<Rc<PhysicalKeyInterceptor>>,
}

impl Services {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the key event bus.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::DuplicateService`] if a bus already exists.
    pub fn install_key_bus(&mut self) -> Result<Rc<KeyEventBus>, ConfigurationError> {
        if self.key_bus.is_some() {
            return Err(ConfigurationError::DuplicateService(KEY_BUS));
        }
        let bus = Rc::new(KeyEventBus::new());
        self.key_bus = Some(Rc::clone(&bus));
        info!("key event bus installed");
        Ok(bus)
    }

    /// The installed key event bus.
    pub fn key_bus(&self) -> Result<Rc<KeyEventBus>, ConfigurationError> {
        self.key_bus
            .clone()
            .ok_or(ConfigurationError::MissingService(KEY_BUS))
    }

    /// Creates the physical key interceptor with its routing policy.
    ///
    /// The interceptor grabs nothing until windows are attached to it.
    pub fn install_interceptor(
        &mut self,
        policy: Box<dyn InterceptPolicy>,
    ) -> Result<Rc<PhysicalKeyInterceptor>, ConfigurationError> {
        if self.interceptor.is_some() {
            return Err(ConfigurationError::DuplicateService(INTERCEPTOR));
        }
        let name = policy.name();
        let interceptor = PhysicalKeyInterceptor::new(policy);
        self.interceptor = Some(Rc::clone(&interceptor));
        info!(policy = name, "physical key interceptor installed");
        Ok(interceptor)
    }

    pub fn interceptor(&self) -> Result<Rc<PhysicalKeyInterceptor>, ConfigurationError> {
        self.interceptor
            .clone()
            .ok_or(ConfigurationError::MissingService(INTERCEPTOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::interceptor::ForwardToFocused;

    #[test]
    fn test_key_bus_before_install_is_missing() {
        let services = Services::new();
        assert_eq!(
            services.key_bus().err(),
            Some(ConfigurationError::MissingService(KEY_BUS))
        );
    }

    #[test]
    fn test_installed_key_bus_is_shared() {
        // Arrange
        let mut services = Services::new();

        // Act
        let installed = services.install_key_bus().expect("first install");
        let fetched = services.key_bus().expect("installed");

        // Assert
        assert!(Rc::ptr_eq(&installed, &fetched));
    }

    #[test]
    fn test_second_key_bus_install_is_rejected() {
        let mut services = Services::new();
        services.install_key_bus().expect("first install");

        let second = services.install_key_bus();

        assert_eq!(
            second.err(),
            Some(ConfigurationError::DuplicateService(KEY_BUS))
        );
    }

    #[test]
    fn test_second_interceptor_install_is_rejected() {
        // Arrange
        let mut services = Services::new();
        services
            .install_interceptor(Box::new(ForwardToFocused))
            .expect("first install");

        // Act
        let second = services.install_interceptor(Box::new(ForwardToFocused));

        // Assert
        assert!(matches!(
            second,
            Err(ConfigurationError::DuplicateService(INTERCEPTOR))
        ));
        assert_eq!(
            services.interceptor().map(|i| i.policy_name()),
            Ok("forward_to_focused")
        );
    }

    #[test]
    fn test_error_messages_name_the_service() {
        assert_eq!(
            ConfigurationError::MissingService(KEY_BUS).to_string(),
            "the key event bus has not been installed"
        );
    }
}
