use crate::commands::{print_json, Context};
use crate::error::not_found;
use anyhow::Result;
use clap::{Args, Subcommand};
use dealhook_core::extract_city;
use serde::Serialize;

#[derive(Debug, Subcommand)]
pub enum CityCommand {
    /// Look up the timezone label for a city name
    Resolve(CityResolveArgs),
    /// Find a `Город:`/`City:` label in free text
    Extract(CityExtractArgs),
    /// List every known city
    List(CityListArgs),
}

#[derive(Debug, Args)]
pub struct CityResolveArgs {
    pub name: String,
}

#[derive(Debug, Args)]
pub struct CityExtractArgs {
    pub text: String,
}

#[derive(Debug, Args)]
pub struct CityListArgs {}

#[derive(Debug, Serialize)]
struct CityDto {
    city: String,
    timezone: Option<String>,
}

#[derive(Debug, Serialize)]
struct CityListDto<'a> {
    version: &'a str,
    cities: Vec<CityDto>,
    aliases: usize,
}

pub fn resolve(ctx: &Context<'_>, args: CityResolveArgs) -> Result<()> {
    let directory = &ctx.config.directory;
    let Some(city) = directory.canonical_name(&args.name) else {
        return Err(not_found(format!("city {}", args.name.trim())));
    };
    let timezone = directory.resolve_timezone(city).map(ToString::to_string);

    if ctx.json {
        return print_json(&CityDto {
            city: city.to_string(),
            timezone,
        });
    }

    println!("{}: {}", city, timezone.unwrap_or_default());
    Ok(())
}

pub fn extract(ctx: &Context<'_>, args: CityExtractArgs) -> Result<()> {
    let Some(city) = extract_city(&args.text) else {
        return Err(not_found("city label in text"));
    };
    let timezone = ctx
        .config
        .directory
        .resolve_timezone(&city)
        .map(ToString::to_string);

    if ctx.json {
        return print_json(&CityDto { city, timezone });
    }

    match timezone {
        Some(timezone) => println!("{}: {}", city, timezone),
        None => println!("{} (unknown timezone)", city),
    }
    Ok(())
}

pub fn list(ctx: &Context<'_>, _args: CityListArgs) -> Result<()> {
    let directory = &ctx.config.directory;
    let cities: Vec<CityDto> = directory
        .entries()
        .into_iter()
        .map(|(city, label)| CityDto {
            city: city.to_string(),
            timezone: Some(label.to_string()),
        })
        .collect();

    if ctx.json {
        return print_json(&CityListDto {
            version: directory.version(),
            cities,
            aliases: directory.alias_count(),
        });
    }

    for item in cities {
        println!("{}\t{}", item.city, item.timezone.unwrap_or_default());
    }
    Ok(())
}
