use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use anyhow::Result;
use clap::Args;
use dealhook_core::normalize_phone;

#[derive(Debug, Args)]
pub struct PhoneArgs {
    pub raw: String,
}

pub fn normalize(ctx: &Context<'_>, args: PhoneArgs) -> Result<()> {
    let Some(phone) = normalize_phone(Some(&args.raw)) else {
        return Err(invalid_input(format!("no digits in phone: {}", args.raw)));
    };
    let links = &ctx.config.links;

    if ctx.json {
        return print_json(&serde_json::json!({
            "phone": phone,
            "whatsapp": links.whatsapp_link(&phone),
            "telegram": links.telegram_link(&phone),
            "call": links.call_link(&phone),
        }));
    }

    println!("{}", phone);
    Ok(())
}
