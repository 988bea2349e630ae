//! Direct `.tgz` archive download

use super::{fetch_url, ChartArchive, GetOptions};
use crate::error::Result;

pub(crate) async fn fetch(opts: &GetOptions) -> Result<ChartArchive> {
    // The caller named this exact url, so any supplied credentials are for it.
    let data = fetch_url(&opts.uri, opts, true).await?;
    Ok(ChartArchive {
        data,
        resolved_url: opts.uri.clone(),
    })
}
