use serde::{Deserialize, Serialize};

/// Structured QR payloads offered by the dashboard's content-type picker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QrContent {
    Url {
        url: String,
    },
    Text {
        text: String,
    },
    Vcard(VCard),
    Email {
        to: String,
        subject: Option<String>,
        body: Option<String>,
    },
    Sms {
        phone: String,
        body: Option<String>,
    },
    Wifi {
        ssid: String,
        password: Option<String>,
        #[serde(default)]
        encryption: WifiEncryption,
        #[serde(default)]
        hidden: bool,
    },
    Location {
        latitude: f64,
        longitude: f64,
    },
    Phone {
        number: String,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct VCard {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub organization: Option<String>,
    pub title: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WifiEncryption {
    #[default]
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "nopass")]
    NoPass,
}

impl WifiEncryption {
    fn as_str(&self) -> &'static str {
        match self {
            WifiEncryption::Wpa => "WPA",
            WifiEncryption::Wep => "WEP",
            WifiEncryption::NoPass => "nopass",
        }
    }
}

/// Escape `\ ; , : "` for the `WIFI:` format.
fn escape_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | ';' | ',' | ':' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// vCard text value: escape `\ ; ,` and fold line breaks into a literal `\n`.
fn escape_vcard(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' | ';' | ',' => {
                out.push('\\');
                out.push(c);
            }
            '\r' => {
                chars.next_if_eq(&'\n');
                out.push_str("\\n");
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Append `?k=v&k=v` for the present, non-empty values.
fn with_query(base: String, pairs: &[(&str, Option<&String>)]) -> String {
    let query: Vec<String> = pairs
        .iter()
        .filter_map(|(key, value)| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| format!("{}={}", key, urlencoding::encode(v)))
        })
        .collect();

    if query.is_empty() {
        base
    } else {
        format!("{}?{}", base, query.join("&"))
    }
}

impl QrContent {
    /// Raw string encoded into the QR symbol.
    pub fn to_payload(&self) -> String {
        match self {
            QrContent::Url { url } => url.trim().to_string(),
            QrContent::Text { text } => text.clone(),
            QrContent::Vcard(card) => card.to_payload(),
            QrContent::Email { to, subject, body } => with_query(
                format!("mailto:{}", to.trim()),
                &[("subject", subject.as_ref()), ("body", body.as_ref())],
            ),
            QrContent::Sms { phone, body } => {
                with_query(format!("sms:{}", phone.trim()), &[("body", body.as_ref())])
            }
            QrContent::Wifi {
                ssid,
                password,
                encryption,
                hidden,
            } => {
                let mut payload = format!("WIFI:T:{};S:{};", encryption.as_str(), escape_field(ssid));
                if *encryption != WifiEncryption::NoPass {
                    if let Some(password) = password.as_deref().filter(|p| !p.is_empty()) {
                        payload.push_str(&format!("P:{};", escape_field(password)));
                    }
                }
                if *hidden {
                    payload.push_str("H:true;");
                }
                payload.push(';');
                payload
            }
            QrContent::Location {
                latitude,
                longitude,
            } => format!("geo:{},{}", latitude, longitude),
            QrContent::Phone { number } => format!("tel:{}", number.trim()),
        }
    }
}

impl VCard {
    pub fn to_payload(&self) -> String {
        let first = escape_vcard(self.first_name.trim());
        let last = escape_vcard(self.last_name.trim());
        let full = [self.first_name.trim(), self.last_name.trim()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");

        let mut lines = vec![
            "BEGIN:VCARD".to_string(),
            "VERSION:3.0".to_string(),
            format!("N:{};{};;;", last, first),
            format!("FN:{}", escape_vcard(&full)),
        ];

        let optional = [
            ("ORG", &self.organization),
            ("TITLE", &self.title),
            ("TEL;TYPE=WORK,VOICE", &self.phone),
            ("EMAIL", &self.email),
            ("URL", &self.url),
        ];
        for (key, value) in optional {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                // URL values are URIs, not text; only line breaks are dropped
                let value = if key == "URL" {
                    value.replace(['\r', '\n'], "")
                } else {
                    escape_vcard(value)
                };
                lines.push(format!("{}:{}", key, value));
            }
        }

        lines.push("END:VCARD".to_string());
        lines.join("\r\n")
    }
}
