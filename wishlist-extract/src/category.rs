//! Ordered keyword rules mapping a (URL, title) pair onto a [`Category`].
//!
//! Rules are evaluated top to bottom and the first hit wins, so order matters:
//! brand and garment rules sit above the Amazon rules, and the "Amazon toy" rule
//! sits above the bare Amazon-domain rule. Reordering changes results for
//! overlapping inputs.

use wishlist_common::Category;

/// URL fragments identifying Amazon storefronts and short links.
const AMAZON_DOMAINS: &[&str] = &["amazon.", "amzn."];

const SHOES: &[&str] = &[
    "nike", "jordan", "adidas", "new balance", "newbalance", "air max", "dunk", "yeezy",
    "converse", "asics", "hoka", "vans.com", "sneaker", "shoe",
];
const JACKET: &[&str] = &["jacket", "bomber", "windbreaker", "anorak"];
const OUTERWEAR: &[&str] = &[
    "patagonia", "north face", "northface", "arcteryx", "arc'teryx", "canada goose",
    "canadagoose", "columbia", "parka", "coat", "puffer", "fleece", "outerwear",
];
const SHIRTS: &[&str] = &[
    "dress shirt", "button-down", "button down", "oxford", "flannel", "polo", "overshirt",
];
const MENSWEAR: &[&str] = &[
    "menswear", "mrporter", "bonobos", "jcrew", "j.crew", "suitsupply", "blazer", "chino",
    "trouser",
];
const GRAPHIC_TEE: &[&str] = &[
    "graphic tee", "graphic-tee", "graphic t-shirt", "band tee", "t-shirt", "tshirt",
];
const UNT_MERCH: &[&str] = &["unt.edu", "untbookstore", "meangreen", "mean green", "north texas"];
const TOY_KEYWORDS: &[&str] = &[
    "lego", "toy", "action figure", "funko", "hot wheels", "nerf", "puzzle", "board game",
    "plush", "playset", "playmobil",
];

/// What a rule looks for. All matching is substring matching on lowercased input.
#[derive(Debug, Clone, Copy)]
enum Predicate {
    /// Any token appears in the URL or the title.
    Any(&'static [&'static str]),
    /// The URL is on an Amazon domain and any token appears in the URL or the title.
    AmazonWith(&'static [&'static str]),
    /// The URL is on an Amazon domain.
    Amazon,
}

#[derive(Debug, Clone, Copy)]
struct Rule {
    when: Predicate,
    category: Category,
}

static RULES: &[Rule] = &[
    Rule { when: Predicate::Any(SHOES), category: Category::Shoes },
    Rule { when: Predicate::Any(JACKET), category: Category::Jacket },
    Rule { when: Predicate::Any(OUTERWEAR), category: Category::Outerwear },
    Rule { when: Predicate::Any(SHIRTS), category: Category::Shirts },
    Rule { when: Predicate::Any(MENSWEAR), category: Category::Menswear },
    Rule { when: Predicate::Any(GRAPHIC_TEE), category: Category::GraphicTee },
    Rule { when: Predicate::Any(UNT_MERCH), category: Category::UNTMerch },
    // must stay above the bare Amazon rule
    Rule { when: Predicate::AmazonWith(TOY_KEYWORDS), category: Category::Toys },
    Rule { when: Predicate::Amazon, category: Category::Amazon },
];

impl Predicate {
    fn matches(self, url: &str, title: &str) -> bool {
        let any = |tokens: &[&str]| tokens.iter().any(|t| url.contains(t) || title.contains(t));
        match self {
            Predicate::Any(tokens) => any(tokens),
            Predicate::AmazonWith(tokens) => is_amazon(url) && any(tokens),
            Predicate::Amazon => is_amazon(url),
        }
    }
}

fn is_amazon(url: &str) -> bool {
    AMAZON_DOMAINS.iter().any(|d| url.contains(d))
}

/// Classify an item. Total: falls through to [`Category::Misc`].
pub fn classify(url: &str, title: &str) -> Category {
    let url = url.to_lowercase();
    let title = title.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.when.matches(&url, &title))
        .map(|rule| rule.category)
        .unwrap_or(Category::Misc)
}
