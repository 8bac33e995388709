//! Engine component and CAPTCHA composition

use secrecy::{ExposeSecret, Secret};
use tracing::{debug, warn};

use crate::config::{CaptchaSettings, ComponentSettings, ImageCaptchaType};
use crate::engine::{CaptchaSpec, ComponentKind, ComponentSpec, FirewallEngine};
use crate::error::Result;

use super::filters::parse_quota;

pub const NUMERIC_POOL: &str = "0123456789";
pub const ALPHA_POOL: &str = "0123456789abcdefghijklmnopqrstuvwxyz";
pub const ALNUM_POOL: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Default image CAPTCHA word length
pub const DEFAULT_WORD_LENGTH: u32 = 4;

pub fn image_pool(kind: ImageCaptchaType) -> &'static str {
    match kind {
        ImageCaptchaType::Numeric => NUMERIC_POOL,
        ImageCaptchaType::Alpha => ALPHA_POOL,
        ImageCaptchaType::Alnum => ALNUM_POOL,
    }
}

/// Components to enable. The IP component is always on; the rest follow their toggles.
pub fn component_specs(settings: &ComponentSettings) -> Vec<ComponentSpec> {
    let mut specs = vec![ComponentSpec {
        kind: ComponentKind::Ip,
        strict: false,
    }];

    if settings.enable_component_trustedbot {
        specs.push(ComponentSpec {
            kind: ComponentKind::TrustedBot,
            strict: false,
        });
    }
    if settings.enable_component_header {
        specs.push(ComponentSpec {
            kind: ComponentKind::Header,
            strict: settings.header_strict_mode,
        });
    }
    if settings.enable_component_agent {
        specs.push(ComponentSpec {
            kind: ComponentKind::UserAgent,
            strict: settings.agent_strict_mode,
        });
    }
    if settings.enable_component_rdns {
        specs.push(ComponentSpec {
            kind: ComponentKind::Rdns,
            strict: settings.rdns_strict_mode,
        });
    }

    specs
}

/// CAPTCHA providers to register, in order. Providers missing their credentials are skipped.
pub fn captcha_specs(settings: &CaptchaSettings) -> Vec<CaptchaSpec> {
    let mut specs = Vec::new();

    if settings.enable_captcha_google {
        let spec = CaptchaSpec::Recaptcha {
            key: settings.google_recaptcha_key.trim().to_string(),
            secret: Secret::new(settings.google_recaptcha_secret.expose_secret().trim().to_string()),
            version: settings.google_recaptcha_version,
            lang: settings.google_recaptcha_lang.clone(),
        };
        if spec.is_configured() {
            specs.push(spec);
        } else {
            debug!("reCAPTCHA enabled without a key pair, skipping");
        }
    }

    if settings.enable_captcha_image {
        let word_length = match parse_quota(
            settings.image_captcha_length.as_deref(),
            DEFAULT_WORD_LENGTH,
            "image_captcha_length",
        ) {
            0 => {
                warn!("Image CAPTCHA length of 0, using {}", DEFAULT_WORD_LENGTH);
                DEFAULT_WORD_LENGTH
            }
            n => n,
        };
        specs.push(CaptchaSpec::Image {
            pool: image_pool(settings.image_captcha_type),
            word_length,
        });
    }

    specs
}

pub fn apply_components<E: FirewallEngine + ?Sized>(settings: &ComponentSettings, engine: &mut E) -> Result<()> {
    for spec in component_specs(settings) {
        engine.enable_component(spec)?;
    }
    Ok(())
}

pub fn apply_captcha<E: FirewallEngine + ?Sized>(settings: &CaptchaSettings, engine: &mut E) -> Result<()> {
    for spec in captcha_specs(settings) {
        engine.add_captcha(spec)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_components() {
        let specs = component_specs(&ComponentSettings::default());
        let kinds: Vec<_> = specs.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![ComponentKind::Ip, ComponentKind::TrustedBot]);
    }

    #[test]
    fn test_strict_modes_follow_toggles() {
        let settings = ComponentSettings {
            enable_component_trustedbot: false,
            enable_component_header: true,
            header_strict_mode: true,
            enable_component_agent: true,
            agent_strict_mode: false,
            enable_component_rdns: true,
            rdns_strict_mode: true,
        };
        let specs = component_specs(&settings);

        assert_eq!(specs.len(), 4);
        assert_eq!(specs[1], ComponentSpec { kind: ComponentKind::Header, strict: true });
        assert_eq!(specs[2], ComponentSpec { kind: ComponentKind::UserAgent, strict: false });
        assert_eq!(specs[3], ComponentSpec { kind: ComponentKind::Rdns, strict: true });
    }

    #[test]
    fn test_recaptcha_without_keys_is_skipped() {
        let specs = captcha_specs(&CaptchaSettings::default());
        assert!(specs.is_empty());
    }

    #[test]
    fn test_recaptcha_with_keys() {
        let settings = CaptchaSettings {
            google_recaptcha_key: "site-key".to_string(),
            google_recaptcha_secret: Secret::new("secret".to_string()),
            ..Default::default()
        };
        let specs = captcha_specs(&settings);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].kind(), "recaptcha");
    }

    #[test]
    fn test_image_captcha_pool_and_length() {
        let settings = CaptchaSettings {
            enable_captcha_google: false,
            enable_captcha_image: true,
            image_captcha_type: ImageCaptchaType::Numeric,
            image_captcha_length: Some("6".to_string()),
            ..Default::default()
        };
        match captcha_specs(&settings).as_slice() {
            [CaptchaSpec::Image { pool, word_length }] => {
                assert_eq!(*pool, NUMERIC_POOL);
                assert_eq!(*word_length, 6);
            }
            other => panic!("unexpected specs: {:?}", other),
        }
    }

    #[test]
    fn test_image_captcha_length_fallback() {
        let settings = CaptchaSettings {
            enable_captcha_google: false,
            enable_captcha_image: true,
            image_captcha_length: Some("0".to_string()),
            ..Default::default()
        };
        match captcha_specs(&settings).as_slice() {
            [CaptchaSpec::Image { pool, word_length }] => {
                assert_eq!(*pool, ALNUM_POOL);
                assert_eq!(*word_length, DEFAULT_WORD_LENGTH);
            }
            other => panic!("unexpected specs: {:?}", other),
        }
    }
}
