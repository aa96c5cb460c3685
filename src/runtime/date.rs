//! Locale-aware parsing of dates as printed by the script interpreter
//!
//! `osascript -s s` prints dates the way the user's locale formats them,
//! e.g. `date "Saturday, March 2, 2024 at 3:04:05 PM"`. The parser rewrites
//! month names and AM/PM markers into numbers and tries a small set of
//! locale-independent layouts on the result.

use chrono::NaiveDateTime;

struct LocaleSymbols {
    months: [&'static str; 12],
    short_months: [&'static str; 12],
    am_pm: (&'static str, &'static str),
}

const ENGLISH: LocaleSymbols = LocaleSymbols {
    months: [
        "January", "February", "March", "April", "May", "June", "July", "August", "September",
        "October", "November", "December",
    ],
    short_months: [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ],
    am_pm: ("AM", "PM"),
};

const GERMAN: LocaleSymbols = LocaleSymbols {
    months: [
        "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September",
        "Oktober", "November", "Dezember",
    ],
    short_months: [
        "Jan.", "Feb.", "März", "Apr.", "Mai", "Juni", "Juli", "Aug.", "Sept.", "Okt.", "Nov.",
        "Dez.",
    ],
    am_pm: ("vorm.", "nachm."),
};

const DUTCH: LocaleSymbols = LocaleSymbols {
    months: [
        "januari", "februari", "maart", "april", "mei", "juni", "juli", "augustus", "september",
        "oktober", "november", "december",
    ],
    short_months: [
        "jan.", "feb.", "mrt.", "apr.", "mei", "jun.", "jul.", "aug.", "sep.", "okt.", "nov.",
        "dec.",
    ],
    am_pm: ("a.m.", "p.m."),
};

const FRENCH: LocaleSymbols = LocaleSymbols {
    months: [
        "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
        "octobre", "novembre", "décembre",
    ],
    short_months: [
        "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
        "déc.",
    ],
    am_pm: ("AM", "PM"),
};

const JAPANESE: LocaleSymbols = LocaleSymbols {
    months: [
        "1月", "2月", "3月", "4月", "5月", "6月", "7月", "8月", "9月", "10月", "11月", "12月",
    ],
    short_months: [
        "1月", "2月", "3月", "4月", "5月", "6月", "7月", "8月", "9月", "10月", "11月", "12月",
    ],
    am_pm: ("午前", "午後"),
};

const US_FORMATS: &[&str] = &["%m %d %Y %I.%M.%S %p", "%m %d %Y %H.%M.%S"];
const YEAR_FIRST_FORMATS: &[&str] = &["%Y %m %d %I.%M.%S %p", "%Y %m %d %H.%M.%S"];
const DAY_FIRST_FORMATS: &[&str] = &[
    "%d %m %Y %I.%M.%S %p",
    "%d %m %Y %H.%M.%S",
    "%d. %m %Y %I.%M.%S %p",
    "%d. %m %Y %H.%M.%S",
];

/// Parser for one locale, e.g. `en_US`, `de_DE`, `ja_JP`
pub struct DateParser {
    locale: String,
    symbols: &'static LocaleSymbols,
    formats: &'static [&'static str],
}

impl DateParser {
    /// Parser for a locale identifier such as `de_DE` or `en-US`
    pub fn new(locale: &str) -> Self {
        let mut parts = locale.split(['_', '-']);
        let language = parts.next().unwrap_or("en").to_ascii_lowercase();
        let country = parts.next().unwrap_or("").to_ascii_uppercase();
        let symbols = match language.as_str() {
            "de" => &GERMAN,
            "nl" => &DUTCH,
            "fr" => &FRENCH,
            "ja" => &JAPANESE,
            _ => &ENGLISH,
        };
        let formats = if country == "US" || country == "CA" || locale.eq_ignore_ascii_case("en")
        {
            US_FORMATS
        } else if language == "ja" {
            YEAR_FIRST_FORMATS
        } else {
            DAY_FIRST_FORMATS
        };
        Self {
            locale: locale.to_string(),
            symbols,
            formats,
        }
    }

    /// Locale this parser was built for
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Parse a localized date string into a naive local timestamp
    pub fn parse(&self, text: &str) -> Option<NaiveDateTime> {
        let normalized = self.normalize(text);
        self.formats
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(&normalized, format).ok())
    }

    fn normalize(&self, text: &str) -> String {
        let mut date = replace_month(text, &self.symbols.months, &self.symbols.short_months)
            .or_else(|| {
                let lower: Vec<String> = self.symbols.months.iter().map(|m| m.to_lowercase()).collect();
                let lower_short: Vec<String> =
                    self.symbols.short_months.iter().map(|m| m.to_lowercase()).collect();
                replace_month(text, &lower, &lower_short)
            })
            .unwrap_or_else(|| text.to_string());

        let (am, pm) = self.symbols.am_pm;
        let has_am = date.contains(am);
        let has_pm = date.contains(pm);
        if has_am {
            date = date.replace(am, "");
        }
        if has_pm {
            date = date.replace(pm, "");
        }

        // drop letters and separators, collapsing them into single spaces
        let mut collapsed = String::with_capacity(date.len());
        let mut last_is_space = false;
        for c in date.chars() {
            if !c.is_alphabetic() && c != ',' && c != '-' && c != ' ' {
                collapsed.push(c);
                last_is_space = false;
            } else if !last_is_space {
                collapsed.push(' ');
                last_is_space = true;
            }
        }
        if collapsed.ends_with('.') {
            collapsed.pop();
        }
        let mut universal = collapsed
            .replace([':', '/'], ".")
            .replace(" . ", " ")
            .trim()
            .to_string();
        if has_am {
            universal.push_str(" AM");
        }
        if has_pm {
            universal.push_str(" PM");
        }
        universal.trim().to_string()
    }
}

/// Replace the longest month name found in `text` with `"<n> "`
fn replace_month<S: AsRef<str>>(text: &str, months: &[S], short_months: &[S]) -> Option<String> {
    [months, short_months].into_iter().find_map(|names| {
        names
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.as_ref().is_empty() && text.contains(name.as_ref()))
            .max_by_key(|(_, name)| name.as_ref().len())
            .map(|(i, name)| text.replace(name.as_ref(), &format!("{} ", i + 1)))
    })
}
