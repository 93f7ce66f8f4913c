use serenity::{
    all::{Colour, Timestamp},
    builder::{CreateEmbed, CreateEmbedFooter},
};

use crate::events::notifier::{EmbedSpec, Tone};

/// Paleta de colores estandarizada para el bot
pub mod colors {
    use serenity::all::Colour;

    pub const SUCCESS_GREEN: Colour = Colour::from_rgb(67, 181, 129);
    pub const ERROR_RED: Colour = Colour::from_rgb(220, 53, 69);
    pub const WARNING_ORANGE: Colour = Colour::from_rgb(255, 193, 7);
    pub const INFO_BLUE: Colour = Colour::from_rgb(52, 144, 220);
}

pub fn tone_colour(tone: Tone) -> Colour {
    match tone {
        Tone::Music => colors::SUCCESS_GREEN,
        Tone::Info => colors::INFO_BLUE,
        Tone::Warning => colors::WARNING_ORANGE,
        Tone::Error => colors::ERROR_RED,
    }
}

/// Convierte un [`EmbedSpec`] en el embed de Serenity
pub fn render_embed(spec: &EmbedSpec) -> CreateEmbed {
    let mut embed = CreateEmbed::default()
        .title(&spec.title)
        .color(tone_colour(spec.tone))
        .timestamp(Timestamp::now());

    if let Some(description) = &spec.description {
        embed = embed.description(description);
    }

    if let Some(thumbnail) = &spec.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }

    if let Some(footer) = &spec.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }

    embed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_colours_are_distinct() {
        let colours = [Tone::Music, Tone::Info, Tone::Warning, Tone::Error].map(tone_colour);
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
