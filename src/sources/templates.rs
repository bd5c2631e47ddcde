//! Post text corpus shared by the simulated platforms.
//!
//! Lines are grouped by business category and polarity and mention the
//! tracked trend vocabulary often enough for trends to emerge.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::BusinessCategory;

const TECHNOLOGY_POSITIVE: &[&str] = &[
    "🚀 Shipped our new AI assistant today, support tickets down 35%. Incredible team effort!",
    "Our SaaS startup just closed a seed round! Super excited to keep building 🎉",
    "Remote engineering done right: async docs, fewer meetings, happier devs. Love it.",
    "The new AI code review tool caught three real bugs on day one. Seriously impressive.",
    "Green data centers are finally cheaper than the old ones. Great news for climate targets 🌿",
    "Hybrid cloud migration finished ahead of schedule. Best quarter our infra team has had!",
];

const TECHNOLOGY_NEGATIVE: &[&str] = &[
    "Another AI product that is just a chatbot wrapper. So tired of the hype 😤",
    "Crypto exchange froze withdrawals again. Terrible way to treat customers.",
    "Our SaaS vendor raised prices 40% with zero notice. Awful renewal experience.",
    "Startup layoffs everywhere this week. Really depressing time to be in tech 📉",
    "Blockchain pilot cancelled after burning the whole budget. What a waste.",
    "Remote access outage locked the entire company out for hours. Not acceptable.",
];

const FASHION_POSITIVE: &[&str] = &[
    "Sustainable fashion is finally mainstream and the quality is amazing ✨",
    "Found a perfect vintage denim jacket at the thrift store for $12. Best find ever!",
    "Eco sneakers that actually look good? Yes please, absolutely love this brand.",
    "Thrift flip challenge results are gorgeous, so much talent in this community 👗",
    "Local designers doing green dyes and small batches. Beautiful and responsible!",
    "Vintage market this weekend was incredible, great prices and friendly sellers.",
];

const FASHION_NEGATIVE: &[&str] = &[
    "Fast fashion haul culture is awful for the climate. Stop buying 40 shirts a month 🌍",
    "Ordered a 'sustainable' dress, it fell apart after one wash. Total scam.",
    "Thrift stores pricing vintage like luxury now. Ridiculous and disappointing.",
    "Fashion brand caught greenwashing their eco line. Not surprised, still angry 👎",
    "Return policy is a nightmare, paid for shipping on a defective item. Terrible service.",
    "Luxury labels raising prices again with worse quality. Pure greed.",
];

const GAMING_POSITIVE: &[&str] = &[
    "The esports finals last night were insane! Best match of the whole season 🔥",
    "Indie gaming is thriving, this studio of four people made a masterpiece.",
    "Streaming my first 24h charity marathon, raised $3k. Amazing community ❤️",
    "Cloud gaming finally feels smooth on a normal connection. Really impressed.",
    "New patch fixed every bug I reported. Great communication from the devs!",
    "Metaverse concert inside the game was surprisingly fun, great visuals ✨",
];

const GAMING_NEGATIVE: &[&str] = &[
    "NFT skins in a paid game? Absolutely not, this is a terrible cash grab.",
    "Servers down on launch day again. Gaming industry never learns 😡",
    "Esports team folded and players were never paid. Awful management.",
    "Streaming platform changed payouts overnight, small creators get hurt the most.",
    "Day one patch is 80GB and the game still crashes. Broken and disappointing.",
    "Metaverse hype died and left empty virtual malls behind. What a waste.",
];

const BUSINESS_POSITIVE: &[&str] = &[
    "Our startup hit profitability this month! Proud of this amazing team 🙌",
    "Hybrid work policy boosted retention by 20%. Great decision by leadership.",
    "Sustainable packaging cut our costs and customers love it. Win-win!",
    "SaaS revenue up 3x year over year, best growth we've ever had 📈",
    "Remote hiring opened up incredible talent we never could have reached before.",
    "Small business grants for green upgrades are a fantastic program.",
];

const BUSINESS_NEGATIVE: &[&str] = &[
    "Crypto payroll experiment was a disaster, employees lost real money.",
    "Return-to-office mandate killed hybrid flexibility. Terrible for morale.",
    "Another startup collapsed after overhyped AI claims. Investors should be worried.",
    "Supply chain delays again, customers are furious and so are we 😤",
    "Climate pledges from big corporations feel like empty marketing. Disappointing.",
    "Blockchain consulting fees were huge and delivered nothing useful.",
];

const ENTERTAINMENT_POSITIVE: &[&str] = &[
    "This streaming series finale was perfect, best TV I've watched in years ✨",
    "Concert tickets were fairly priced for once. Amazing night, great crowd!",
    "Indie film festival lineup is incredible, so much fresh talent 🎬",
    "Vintage vinyl revival is real, record stores are packed and I love it.",
    "AI-restored classic movie looks stunning in 4K. Really impressive work.",
    "Podcast network launched a green production pledge. Great example for the industry.",
];

const ENTERTAINMENT_NEGATIVE: &[&str] = &[
    "Streaming prices went up again and my favourite show got cancelled. Awful.",
    "Ticket fees doubled the price of the show. Total ripoff 👎",
    "AI-generated scripts are ruining the sequel. Lazy and boring.",
    "Another NFT movie collectible launch that nobody asked for. Pointless.",
    "Sound was terrible at the festival and refunds were refused. Never again.",
    "Metaverse premiere crashed for half the audience. Embarrassing.",
];

fn lines(category: BusinessCategory, positive: bool) -> &'static [&'static str] {
    match (category, positive) {
        (BusinessCategory::Technology, true) => TECHNOLOGY_POSITIVE,
        (BusinessCategory::Technology, false) => TECHNOLOGY_NEGATIVE,
        (BusinessCategory::Fashion, true) => FASHION_POSITIVE,
        (BusinessCategory::Fashion, false) => FASHION_NEGATIVE,
        (BusinessCategory::Gaming, true) => GAMING_POSITIVE,
        (BusinessCategory::Gaming, false) => GAMING_NEGATIVE,
        (BusinessCategory::Business, true) => BUSINESS_POSITIVE,
        (BusinessCategory::Business, false) => BUSINESS_NEGATIVE,
        (BusinessCategory::Entertainment, true) => ENTERTAINMENT_POSITIVE,
        (BusinessCategory::Entertainment, false) => ENTERTAINMENT_NEGATIVE,
    }
}

/// Pick a random line for a category and polarity.
pub fn pick<R: Rng + ?Sized>(category: BusinessCategory, positive: bool, rng: &mut R) -> &'static str {
    lines(category, positive).choose(rng).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BusinessCategory;

    #[test]
    fn test_every_category_has_both_polarities() {
        for category in BusinessCategory::ALL {
            assert!(!lines(category, true).is_empty(), "{category} positive");
            assert!(!lines(category, false).is_empty(), "{category} negative");
        }
    }
}
