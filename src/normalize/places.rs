//! Gazetteer data used to tell countries apart from the places inside them.
//!
//! Lookups are case-insensitive. Only exact names match; there is no fuzzy
//! matching.

/// Country names and common aliases, lower-cased.
const COUNTRIES: &[&str] = &[
    "afghanistan", "albania", "algeria", "andorra", "angola", "antigua and barbuda", "argentina",
    "armenia", "australia", "austria", "österreich", "azerbaijan", "bahamas", "bahrain",
    "bangladesh", "barbados", "belarus", "belgium", "belgië", "belgique", "belize", "benin",
    "bhutan", "bolivia", "bosnia and herzegovina", "botswana", "brazil", "brasil", "brunei",
    "bulgaria", "burkina faso", "burundi", "cabo verde", "cape verde", "cambodia", "cameroon",
    "canada", "central african republic", "chad", "chile", "china", "people's republic of china",
    "colombia", "comoros", "congo", "democratic republic of the congo", "costa rica",
    "côte d'ivoire", "ivory coast", "croatia", "hrvatska", "cuba", "cyprus", "czechia",
    "czech republic", "česko", "denmark", "danmark", "djibouti", "dominica", "dominican republic",
    "ecuador", "egypt", "el salvador", "equatorial guinea", "eritrea", "estonia", "eswatini",
    "ethiopia", "fiji", "finland", "suomi", "france", "gabon", "gambia", "georgia", "germany",
    "deutschland", "ghana", "greece", "hellas", "grenada", "guatemala", "guinea", "guinea-bissau",
    "guyana", "haiti", "honduras", "hungary", "magyarország", "iceland", "ísland", "india",
    "indonesia", "iran", "iraq", "ireland", "éire", "israel", "italy", "italia", "jamaica",
    "japan", "nippon", "jordan", "kazakhstan", "kenya", "kiribati", "kosovo", "kuwait",
    "kyrgyzstan", "laos", "latvia", "lebanon", "lesotho", "liberia", "libya", "liechtenstein",
    "lithuania", "luxembourg", "madagascar", "malawi", "malaysia", "maldives", "mali", "malta",
    "marshall islands", "mauritania", "mauritius", "mexico", "méxico", "micronesia", "moldova",
    "monaco", "mongolia", "montenegro", "morocco", "mozambique", "myanmar", "burma", "namibia",
    "nauru", "nepal", "netherlands", "the netherlands", "nederland", "holland", "new zealand",
    "nicaragua", "niger", "nigeria", "north korea", "north macedonia", "norway", "norge", "oman",
    "pakistan", "palau", "palestine", "panama", "papua new guinea", "paraguay", "peru",
    "philippines", "poland", "polska", "portugal", "qatar", "romania", "russia",
    "russian federation", "rwanda", "saint kitts and nevis", "saint lucia",
    "saint vincent and the grenadines", "samoa", "san marino", "são tomé and príncipe",
    "saudi arabia", "senegal", "serbia", "seychelles", "sierra leone", "singapore", "slovakia",
    "slovenia", "solomon islands", "somalia", "south africa", "south korea", "korea",
    "republic of korea", "south sudan", "spain", "españa", "sri lanka", "sudan", "suriname",
    "sweden", "sverige", "switzerland", "schweiz", "suisse", "svizzera", "syria", "taiwan",
    "tajikistan", "tanzania", "thailand", "timor-leste", "east timor", "togo", "tonga",
    "trinidad and tobago", "tunisia", "turkey", "türkiye", "turkmenistan", "tuvalu", "uganda",
    "ukraine", "united arab emirates", "uae", "united kingdom", "uk", "u.k.", "great britain",
    "britain", "england", "scotland", "wales", "northern ireland", "uruguay", "uzbekistan",
    "vanuatu", "vatican city", "holy see", "venezuela", "vietnam", "viet nam", "yemen", "zambia",
    "zimbabwe", "usa", "us", "u.s.", "u.s.a.", "united states", "united states of america",
    "america",
];

/// Names that mark a label as being in the United States.
const US_ALIASES: &[&str] = &[
    "usa", "us", "u.s.", "u.s.a.", "united states", "united states of america", "america",
];

/// US states and territories, lower-cased name to postal code.
const US_STATES: &[(&str, &str)] = &[
    ("alabama", "AL"), ("alaska", "AK"), ("arizona", "AZ"), ("arkansas", "AR"),
    ("california", "CA"), ("colorado", "CO"), ("connecticut", "CT"), ("delaware", "DE"),
    ("district of columbia", "DC"), ("florida", "FL"), ("georgia", "GA"), ("hawaii", "HI"),
    ("idaho", "ID"), ("illinois", "IL"), ("indiana", "IN"), ("iowa", "IA"), ("kansas", "KS"),
    ("kentucky", "KY"), ("louisiana", "LA"), ("maine", "ME"), ("maryland", "MD"),
    ("massachusetts", "MA"), ("michigan", "MI"), ("minnesota", "MN"), ("mississippi", "MS"),
    ("missouri", "MO"), ("montana", "MT"), ("nebraska", "NE"), ("nevada", "NV"),
    ("new hampshire", "NH"), ("new jersey", "NJ"), ("new mexico", "NM"), ("new york", "NY"),
    ("north carolina", "NC"), ("north dakota", "ND"), ("ohio", "OH"), ("oklahoma", "OK"),
    ("oregon", "OR"), ("pennsylvania", "PA"), ("puerto rico", "PR"), ("rhode island", "RI"),
    ("south carolina", "SC"), ("south dakota", "SD"), ("tennessee", "TN"), ("texas", "TX"),
    ("utah", "UT"), ("vermont", "VT"), ("virginia", "VA"), ("washington", "WA"),
    ("west virginia", "WV"), ("wisconsin", "WI"), ("wyoming", "WY"),
];

/// Whether `name` is a country name or alias. Some are also US states.
pub(super) fn is_country_name(name: &str) -> bool {
    COUNTRIES.contains(&name.to_lowercase().as_str())
}

pub(super) fn is_us_alias(name: &str) -> bool {
    US_ALIASES.contains(&name.to_lowercase().as_str())
}

/// Postal code for a full US state name.
pub(super) fn us_state_code(name: &str) -> Option<&'static str> {
    let name = name.to_lowercase();
    US_STATES
        .iter()
        .find(|(state, _)| *state == name)
        .map(|(_, code)| *code)
}

pub(super) fn is_us_state_code(code: &str) -> bool {
    US_STATES
        .iter()
        .any(|(_, known)| known.eq_ignore_ascii_case(code))
}
