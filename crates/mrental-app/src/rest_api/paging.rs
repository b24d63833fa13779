use crate::error::ApiResult;
use garde::Validate;
use mrental_dal::ListingParams;

mod parsers;

/// Optional paging and sorting of listings.
///
/// Without `page` and `page_size` the whole collection is returned.
#[derive(Debug, Clone, Default, Validate, serde::Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct Paging {
    #[garde(range(min = 1))]
    page: Option<u32>,
    #[garde(range(min = 1, max = 1000))]
    page_size: Option<u32>,
    #[garde(length(max = 255))]
    sort: Option<String>,
}

impl Paging {
    pub fn into_listing_params(self, default_page_size: u32) -> ApiResult<ListingParams> {
        let mut params = if self.page.is_none() && self.page_size.is_none() {
            ListingParams::default()
        } else {
            let page = i64::from(self.page.unwrap_or(1));
            let page_size = i64::from(self.page_size.unwrap_or(default_page_size));
            ListingParams::new((page - 1) * page_size, page_size)
        };

        if let Some(sort) = self.sort.as_deref() {
            params = params.with_order(parsers::parse_ordering(sort)?);
        }
        Ok(params)
    }
}
