//! Text renderings of a lead for sharing and copying.
//!
//! Both renderings walk the same field table in the same order; they differ
//! only in how labels are decorated. Share text uses WhatsApp's `*bold*`
//! markup and is percent-encoded into a deep link, so its line breaks travel
//! as `%0A`. Copy text is plain and goes to the clipboard as is.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::catalog::SearchFilter;
use crate::lead::LeadRecord;

const NOT_PROVIDED: &str = "Not Provided";
const NOT_AVAILABLE: &str = "N.A.";
const WHATSAPP_SEND: &str = "whatsapp://send?text=";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareMode {
    /// Bold labels for external messaging.
    Share,
    /// Plain labels for the clipboard.
    Copy,
}

impl ShareMode {
    fn label(self, label: &str) -> String {
        match self {
            ShareMode::Share => format!("*{label}:*"),
            ShareMode::Copy => format!("{label}:"),
        }
    }
}

struct Field {
    label: &'static str,
    render: fn(&LeadRecord) -> Option<String>,
}

/// Renders a count: the number itself when non-negative, `N.A.` otherwise.
fn count(value: Option<i64>) -> Option<String> {
    value.map(|n| {
        if n >= 0 {
            n.to_string()
        } else {
            NOT_AVAILABLE.to_owned()
        }
    })
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty()).cloned()
}

const FIELDS: &[Field] = &[
    Field {
        label: "Name",
        render: |lead| {
            Some(non_empty(lead.contact_name.as_ref()).unwrap_or_else(|| NOT_PROVIDED.to_owned()))
        },
    },
    Field {
        label: "Number",
        render: |lead| {
            lead.phones
                .as_ref()
                .filter(|phones| !phones.is_empty())
                .map(|phones| phones.join(","))
        },
    },
    Field {
        label: "Liters of Oxygen",
        render: |lead| {
            lead.litres.map(|l| {
                if l >= 0.0 {
                    l.to_string()
                } else {
                    NOT_AVAILABLE.to_owned()
                }
            })
        },
    },
    Field {
        label: "ICU Beds without Ventilators",
        render: |lead| count(lead.available_no_ventilator_beds),
    },
    Field {
        label: "ICU Beds with Ventilators",
        render: |lead| count(lead.available_ventilator_beds),
    },
    Field {
        label: "Total ICU beds",
        render: |lead| count(lead.total_available_icu_beds),
    },
    Field {
        label: "Beds without Oxygen",
        render: |lead| count(lead.available_no_oxygen_beds),
    },
    Field {
        label: "Beds with Oxygen",
        render: |lead| count(lead.available_oxygen_beds),
    },
    Field {
        label: "Beds for Covid",
        render: |lead| count(lead.available_covid_beds),
    },
    Field {
        label: "Total Beds",
        render: |lead| count(lead.total_available_beds),
    },
    Field {
        label: "Address",
        render: |lead| non_empty(lead.address.as_ref()),
    },
    Field {
        label: "Details",
        render: |lead| non_empty(lead.details.as_ref()),
    },
    Field {
        label: "Source",
        render: |lead| lead.first_source_url().map(str::to_owned),
    },
];

/// Renders `lead` as a text block.
///
/// The header names the resolved category and city of `filter`, so the
/// label always matches what was queried. `site_url` goes into the footer.
#[must_use]
pub fn format_lead(
    filter: &SearchFilter,
    lead: &LeadRecord,
    mode: ShareMode,
    site_url: &str,
) -> String {
    let mut lines = vec![format!(
        "Found this resource for {} in {}",
        filter.label(),
        filter.city
    )];

    lines.extend(FIELDS.iter().filter_map(|field| {
        (field.render)(lead).map(|value| format!("{} {value}", mode.label(field.label)))
    }));

    lines.push(String::new());
    lines.push(format!("Found by {site_url}"));
    lines.join("\n")
}

/// Deep link that opens WhatsApp with `text` pre-filled.
#[must_use]
pub fn whatsapp_link(text: &str) -> String {
    format!(
        "{WHATSAPP_SEND}{}",
        utf8_percent_encode(text, NON_ALPHANUMERIC)
    )
}
