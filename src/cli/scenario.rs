use clap::Parser;
use tokio::{
    io::{AsyncBufReadExt, BufReader, stdin},
    try_join,
};

use crate::{
    api::{Api, Latest},
    cli::RegionArgs,
    core::{
        region::Region,
        scenario::{Adjustment, Scenario},
    },
    prelude::*,
    quantity::percent::Percent,
    settings::Settings,
    tables::{build_chart_table, build_scenario_summary_table},
};

#[derive(Parser)]
pub struct ScenarioArgs {
    #[clap(flatten)]
    pub region: RegionArgs,

    /// Electricity usage change applied to the forecast, within -50..=50 percent.
    #[clap(long = "electricity-rate", default_value = "0", allow_negative_numbers = true)]
    pub electricity_rate: Percent,

    /// Gas usage change applied to the forecast, within -50..=50 percent.
    #[clap(long = "gas-rate", default_value = "0", allow_negative_numbers = true)]
    pub gas_rate: Percent,

    /// Keep reading regions from stdin, one `<city> [county]` per line.
    ///
    /// An empty line selects the whole nation. A new line cancels the pending one.
    #[clap(long)]
    pub watch: bool,
}

pub async fn scenario(args: &ScenarioArgs, api: &Api, settings: &Settings) -> Result {
    let adjustment = Adjustment::try_new(args.electricity_rate, args.gas_rate)?;
    if args.watch {
        watch(api, adjustment, *settings).await
    } else {
        show_scenario(api, args.region.region(), adjustment, settings).await
    }
}

async fn watch(api: &Api, adjustment: Adjustment, settings: Settings) -> Result {
    let mut lines = BufReader::new(stdin()).lines();
    let mut latest = Latest::default();
    info!("reading regions from stdin…");
    while let Some(line) = lines.next_line().await? {
        let region = match line.parse::<Region>() {
            Ok(region) => region,
            Err(error) => {
                warn!("skipping the line: {error:#}");
                continue;
            }
        };
        let api = api.clone();
        latest.replace(async move {
            if let Err(error) = show_scenario(&api, region, adjustment, &settings).await {
                error!("failed to load the scenario: {error:#}");
            }
        });
    }
    latest.finish().await?;
    Ok(())
}

#[instrument(skip_all, fields(region = %region))]
async fn show_scenario(
    api: &Api,
    region: Region,
    adjustment: Adjustment,
    settings: &Settings,
) -> Result {
    let (actual, predicted) =
        try_join!(api.get_energy(region), api.get_predicted_energy(region))?;
    let scenario = Scenario::builder()
        .actual(&actual)
        .actual_until(settings.actual_until)
        .predicted(&predicted)
        .adjustment(adjustment)
        .coefficients(settings.coefficients.standard)
        .build();
    match scenario.last_actual() {
        Some((month, _)) => info!(
            last_actual = %month.label(),
            n_actual = scenario.n_actual(),
            n_predicted = scenario.n_predicted(),
            "built the scenario",
        ),
        None => warn!(n_predicted = scenario.n_predicted(), "no actual data"),
    }

    println!("{}", build_chart_table(&scenario.chart()));
    let summary = scenario.summary(settings.target_year, settings.target_reduction);
    println!("{}", build_scenario_summary_table(&summary));
    Ok(())
}
