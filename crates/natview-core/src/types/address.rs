//! Memory address type.

use std::fmt;

/// Strongly typed memory address
///
/// Pointer-valued expressions come back from the variable accessor as display
/// text (`0x00007ff7bfeff4a0`, `0x1000 {value=3}`), and traversal only ever
/// needs two questions answered about them: is it null, and is it the same node
/// as another one. This newtype keeps those values apart from sizes and counts.
///
/// ## Example
///
/// ```rust
/// use natview_core::types::Address;
///
/// let addr = Address::parse_leading("0x1000 {value=3}").unwrap();
/// assert_eq!(addr.value(), 0x1000);
/// assert!(!addr.is_null());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    ///
    /// This is equivalent to `Address::from(value)` but can be used in const contexts.
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Whether this is the null address
    pub const fn is_null(self) -> bool
    {
        self.0 == 0
    }

    /// Parse the address at the start of a pointer's display text
    ///
    /// Accepts `0x`-prefixed hexadecimal or plain decimal. Anything after the
    /// first whitespace (debuggers like to append `{...}` previews or symbol
    /// names) is ignored.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use natview_core::types::Address;
    ///
    /// assert_eq!(Address::parse_leading("0x0"), Some(Address::ZERO));
    /// assert_eq!(Address::parse_leading("4096 <main+12>"), Some(Address::new(4096)));
    /// assert_eq!(Address::parse_leading("<error>"), None);
    /// ```
    pub fn parse_leading(text: &str) -> Option<Self>
    {
        let token = text.split_whitespace().next()?;
        let parsed = match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).ok(),
            None => token.parse::<u64>().ok(),
        };
        parsed.map(Address)
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}
