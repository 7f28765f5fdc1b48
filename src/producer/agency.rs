use crate::config::ConverterConfig;
use crate::netex::objects::Authority;
use crate::objects::Agency;
use log::warn;

/// Used when no url is known for an authority, `agency_url` being mandatory
pub const PLACEHOLDER_URL: &str = "https://";

pub struct AgencyProducer<'a> {
    config: &'a ConverterConfig,
    time_zone: &'a str,
    lang: Option<&'a str>,
}

impl<'a> AgencyProducer<'a> {
    pub fn new(config: &'a ConverterConfig, time_zone: &'a str, lang: Option<&'a str>) -> Self {
        AgencyProducer {
            config,
            time_zone,
            lang,
        }
    }

    fn url(&self, authority: &Authority) -> String {
        if let Some(url) = &authority.url {
            return url.clone();
        }
        let codespace = authority.id.split(':').next().unwrap_or_default();
        match self
            .config
            .agency_url_fallback(codespace)
            .or_else(|| self.config.agency_url_fallback(&self.config.codespace))
        {
            Some(url) => url.to_owned(),
            None => {
                warn!(
                    "no url for authority {}, using the placeholder {}",
                    authority.id, PLACEHOLDER_URL
                );
                PLACEHOLDER_URL.to_owned()
            }
        }
    }

    pub fn produce(&self, authority: &Authority) -> Agency {
        Agency {
            id: authority.id.clone(),
            name: authority.name.clone(),
            url: self.url(authority),
            timezone: self.time_zone.to_owned(),
            lang: self.lang.map(|l| l.to_owned()),
            phone: authority.phone.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authority(url: Option<&str>) -> Authority {
        Authority {
            id: "RUT:Authority:RUT".to_owned(),
            name: "Ruter".to_owned(),
            url: url.map(|u| u.to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn url_precedence() {
        let config = ConverterConfig::new("ENT").with_agency_url_fallback("RUT", "https://ruter.no");
        let producer = AgencyProducer::new(&config, "Europe/Oslo", Some("no"));

        let agency = producer.produce(&authority(Some("https://example.com")));
        assert_eq!("https://example.com", agency.url);
        assert_eq!("Europe/Oslo", agency.timezone);
        assert_eq!(Some("no".to_owned()), agency.lang);

        assert_eq!("https://ruter.no", producer.produce(&authority(None)).url);

        let config = ConverterConfig::new("ENT");
        let producer = AgencyProducer::new(&config, "Europe/Oslo", None);
        assert_eq!(PLACEHOLDER_URL, producer.produce(&authority(None)).url);
    }
}
