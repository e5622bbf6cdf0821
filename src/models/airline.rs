//! Operator lookup by ICAO callsign prefix.

/// Known ICAO operator designators and their display names.
const OPERATORS: &[(&str, &str)] = &[
    ("LOT", "LOT Polish Airlines"),
    ("ENT", "Enter Air"),
    ("SLK", "SprintAir"),
    ("DLH", "Lufthansa"),
    ("BAW", "British Airways"),
    ("AFR", "Air France"),
    ("KLM", "KLM"),
    ("AUA", "Austrian Airlines"),
    ("SWR", "Swiss International"),
    ("SAS", "SAS Scandinavian"),
    ("FIN", "Finnair"),
    ("IBE", "Iberia"),
    ("AEE", "Aegean Airlines"),
    ("TAP", "TAP Air Portugal"),
    ("CSA", "Czech Airlines"),
    ("MSR", "EgyptAir"),
    ("RYR", "Ryanair"),
    ("EZY", "easyJet"),
    ("WZZ", "Wizz Air"),
    ("VLG", "Vueling"),
    ("EWG", "Eurowings"),
    ("BEL", "Brussels Airlines"),
    ("UAL", "United Airlines"),
    ("AAL", "American Airlines"),
    ("DAL", "Delta Air Lines"),
    ("SWA", "Southwest Airlines"),
    ("JBU", "JetBlue Airways"),
    ("ANA", "ANA All Nippon Airways"),
    ("JAL", "Japan Airlines"),
    ("CCA", "Air China"),
    ("CES", "China Eastern"),
    ("CSN", "China Southern"),
    ("SIA", "Singapore Airlines"),
    ("THA", "Thai Airways"),
    ("UAE", "Emirates"),
    ("QTR", "Qatar Airways"),
    ("ETD", "Etihad Airways"),
    ("FDX", "FedEx"),
    ("UPS", "UPS Airlines"),
    ("DHL", "DHL"),
    ("GTI", "Atlas Air"),
    ("AFL", "Aeroflot"),
    ("SBI", "S7 Airlines"),
    ("AUI", "Ukraine International"),
    ("ELY", "El Al"),
    ("THY", "Turkish Airlines"),
    ("SVA", "Saudi Arabian Airlines"),
];

/// Resolves the operator name for a callsign such as `LOT3AB`.
pub fn airline_for_callsign(callsign: &str) -> Option<&'static str> {
    let prefix = callsign.trim().get(..3)?.to_ascii_uppercase();
    OPERATORS.iter().find(|(code, _)| *code == prefix).map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_operator() {
        assert_eq!(airline_for_callsign("LOT3AB"), Some("LOT Polish Airlines"));
        assert_eq!(airline_for_callsign(" ryr12ab "), Some("Ryanair"));
    }

    #[test]
    fn test_unknown_or_short_callsign() {
        assert_eq!(airline_for_callsign("N123AB"), None);
        assert_eq!(airline_for_callsign("LO"), None);
        assert_eq!(airline_for_callsign(""), None);
    }
}
