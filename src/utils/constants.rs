//! Shared constants and invariants

pub const DEFAULT_SERVICE_URL: &str = "https://sharecode.ft.com";
pub const DEFAULT_SHARE_AMOUNT: u32 = 1;
/// Amount used whenever a custom amount is empty or not a positive integer.
pub const CUSTOM_AMOUNT_FALLBACK: u32 = 5;
/// Balance shown when the issuing service answers with `success: false`.
pub const TOKEN_BALANCE_FALLBACK: u64 = 10;

pub const DEFAULT_CLAIM_DELAY_MS: u64 = 5000;
pub const DEFAULT_POPUP_WIDTH: u32 = 646;
pub const DEFAULT_POPUP_HEIGHT: u32 = 436;

pub const SHARE_CODE_PARAM: &str = "share_code";

// Issuing service endpoints
pub const GENERATE_PATH: &str = "/generate";
pub const REMAINING_AMOUNT_PATH: &str = "/remainingamount";

// Markup contract
pub const COMPONENT_NAME: &str = "labs-o-share";
pub const INITIALIZED_ATTR: &str = "data-labs-o-share--js";
pub const LINKS_ATTR: &str = "data-labs-o-share-links";
pub const URL_ATTR: &str = "data-labs-o-share-url";
pub const TITLE_ATTR: &str = "data-labs-o-share-title";
pub const TITLE_EXTRA_ATTR: &str = "data-labs-o-share-titleExtra";
pub const SUMMARY_ATTR: &str = "data-labs-o-share-summary";
pub const RELATED_TWITTER_ACCOUNTS_ATTR: &str = "data-labs-o-share-relatedTwitterAccounts";

// Feedback messages
pub const COPIED_MESSAGE: &str = "Link copied to clipboard";
pub const COPY_INSTRUCTION_MESSAGE: &str = "Copy link to clipboard";
