//! The fixed text of the letter: chapter titles, generation prompts and the
//! fallback lines shown when generation is unavailable.

/// Number of content slides in the letter.
pub const SLIDE_COUNT: usize = 6;

pub const TITLES: [&str; SLIDE_COUNT] = [
    "La Prueba de la Distancia",
    "El Puente de la Confianza",
    "El Susurro de las Palabras",
    "El Cultivo de la Paciencia",
    "La Visión del Futuro",
    "El Sello de la Eternidad",
];

const PROMPTS: [&str; SLIDE_COUNT] = [
    "Escribe una frase poética sobre cómo nuestro amor galopa como un corcel incansable sobre un campo de pétalos de sakura, ignorando la distancia. Máximo 15 palabras.",
    "Escribe una frase sobre la confianza como las raíces profundas de un cerezo y la lealtad de un espíritu de caballo que siempre vuelve a ti. Máximo 15 palabras.",
    "Escribe una frase sobre nuestras palabras como pétalos al viento de glicinas, volando hacia tu alma en el lomo de un suspiro. Máximo 15 palabras.",
    "Escribe una frase sobre la paciencia de esperar la primavera para florecer juntos, con la nobleza y fuerza de un caballo fiel. Máximo 15 palabras.",
    "Escribe una frase sobre un futuro donde cabalgamos libres entre bosques de sakuras eternas, sin mapas ni fronteras. Máximo 15 palabras.",
    "Escribe una frase final sobre nuestra unión eterna: un galope infinito en un jardín que nunca deja de florecer para nosotros. Máximo 15 palabras.",
];

const STYLE_SUFFIX: &str = " En español muy romántico y poético.";

/// Lines used, per slide, when a single-slide generation fails.
pub const FALLBACKS: [&str; SLIDE_COUNT] = [
    "La distancia es solo una prueba de lo lejos que puede viajar nuestro amor.",
    "Como raíces de cerezo, mi confianza en ti crece donde nadie la ve.",
    "Cada palabra mía es un pétalo que el viento lleva hasta tu alma.",
    "Esperaré la primavera contigo, fiel como un corcel que siempre vuelve.",
    "Cabalgaremos libres entre sakuras eternas, sin mapas ni fronteras.",
    "Nuestro amor es un galope infinito en un jardín que nunca deja de florecer.",
];

pub const BATCH_PROMPT: &str = "Escribe seis frases poéticas, una por capítulo de una carta de amor: \
1) la distancia que nuestro amor vence galopando sobre pétalos de sakura; \
2) la confianza como raíces de cerezo; \
3) nuestras palabras como pétalos de glicina al viento; \
4) la paciencia de esperar la primavera juntos; \
5) un futuro libre entre bosques de sakuras eternas; \
6) nuestra unión eterna en un jardín que siempre florece. \
Cada frase de máximo 15 palabras, en español muy romántico y poético. \
Responde únicamente con un arreglo JSON de seis cadenas.";

/// Lines used, all together, when the batch generation fails or cannot be parsed.
pub const BATCH_FALLBACKS: [&str; SLIDE_COUNT] = [
    "Ni mil kilómetros detienen a un corazón que galopa hacia ti.",
    "Confío en ti como el cerezo confía en la primavera.",
    "Mis palabras vuelan a ti en pétalos de glicina.",
    "Florecer juntos vale cada invierno de espera.",
    "Nuestro futuro es un bosque de sakuras sin fronteras.",
    "Tú y yo: un jardín que jamás deja de florecer.",
];

pub const DECISION_QUESTION: &str = "¿Caminarás conmigo por este jardín para siempre?";
pub const ANSWER_YES: &str = "Entonces el jardín florecerá para siempre. Te amo.";
pub const ANSWER_NO: &str = "Esperaré, como el cerezo espera la primavera.";

/// Full prompt sent for a single slide.
pub fn slide_prompt(index: usize) -> String {
    format!("{}{STYLE_SUFFIX}", PROMPTS[index])
}
