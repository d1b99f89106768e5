/// Multipart field name carrying the applicant's full name.
pub const FULL_NAME_ID: &str = "fullName";
/// The photo question; its answer is derived from the attached files.
pub const FILE_MARKER_ID: &str = "q24";

const YES_NO: &[&str] = &["Sí", "No"];
const HOUSING: &[&str] = &["Casa", "Departamento"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Text,
    LongText,
    SingleChoice(&'static [&'static str]),
    FileMarker,
}

/// Which layout block a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Personal,
    Questionnaire,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: QuestionKind,
    pub required: bool,
    pub section: Section,
}

const fn personal(id: &'static str, label: &'static str, required: bool) -> Question {
    Question {
        id,
        label,
        kind: QuestionKind::Text,
        required,
        section: Section::Personal,
    }
}

const fn ask(
    id: &'static str,
    label: &'static str,
    kind: QuestionKind,
    required: bool,
) -> Question {
    Question {
        id,
        label,
        kind,
        required,
        section: Section::Questionnaire,
    }
}

/// Canonical catalog. Order is significant: it drives field order on the wire,
/// validation order, and layout order.
pub static QUESTIONS: [Question; 33] = [
    personal(FULL_NAME_ID, "Nombres y Apellidos", true),
    personal("dni", "DNI", true),
    personal("address", "Domicilio", true),
    personal("neighborhood", "Barrio", false),
    personal("city", "Ciudad", true),
    personal("phone", "Teléfonos", true),
    personal("email", "E-Mail", true),
    personal(
        "socialMedia",
        "Usuario en redes sociales (Facebook o Instagram)",
        false,
    ),
    ask("q1", "1. ¿Cuántas personas viven en la casa?", QuestionKind::Text, true),
    ask("q2", "2. ¿De qué edades?", QuestionKind::LongText, false),
    ask(
        "q3",
        "3. ¿Están todos los miembros de la familia de acuerdo en adoptar?",
        QuestionKind::SingleChoice(YES_NO),
        true,
    ),
    ask(
        "q4",
        "4. ¿A qué se dedican los miembros de la familia o qué profesión ejercen?",
        QuestionKind::LongText,
        false,
    ),
    ask(
        "q5",
        "5. ¿Tiene algún animal en casa? ¿Cuál? ¿Está castrado?",
        QuestionKind::LongText,
        false,
    ),
    ask(
        "q6",
        "6. Si tienen perros, ¿de qué raza son y qué temperamento tienen?",
        QuestionKind::LongText,
        false,
    ),
    ask(
        "q7",
        "7. ¿En qué parte de la casa vive el perro?",
        QuestionKind::LongText,
        false,
    ),
    ask(
        "q8",
        "8. Si no tienen, ¿han tenido? Si es así, ¿qué pasó con ellos?",
        QuestionKind::LongText,
        false,
    ),
    ask(
        "q9",
        "9. ¿Por qué quiere adoptar? ¿Cuál es su motivación?",
        QuestionKind::LongText,
        true,
    ),
    ask(
        "q10",
        "10. ¿Vio algún rescatado en nuestra Web que lo haya decidido a adoptar?",
        QuestionKind::LongText,
        false,
    ),
    ask(
        "q11",
        "11. ¿Dónde vivirá el animal? (casa, departamento)",
        QuestionKind::SingleChoice(HOUSING),
        true,
    ),
    ask(
        "q12",
        "12. En caso de tener jardín o patio, ¿están totalmente cerrados?",
        QuestionKind::SingleChoice(YES_NO),
        false,
    ),
    ask(
        "q13",
        "13. ¿Tienen la vivienda en propiedad o alquiler? En el último caso, ¿cuentan con la autorización del propietario?",
        QuestionKind::LongText,
        false,
    ),
    ask(
        "q14",
        "14. ¿Han pensado qué pasaría con el perro si tuvieran que cambiar de domicilio?",
        QuestionKind::LongText,
        false,
    ),
    ask(
        "q15",
        "15. En caso de enfermedad o algún imprevisto, ¿tienen quién se haga cargo del animal?",
        QuestionKind::LongText,
        false,
    ),
    ask("q16", "16. ¿Dónde dormirá el perro?", QuestionKind::LongText, false),
    ask(
        "q17",
        "17. ¿Cuántas veces lo sacarán al día y quién se encargará de hacerlo?",
        QuestionKind::LongText,
        false,
    ),
    ask(
        "q18",
        "18. ¿Cuánto tiempo pasará el animal solo en casa?",
        QuestionKind::LongText,
        false,
    ),
    ask(
        "q19",
        "19. ¿Han pensado qué hacer con el animal en vacaciones?",
        QuestionKind::LongText,
        false,
    ),
    ask(
        "q20",
        "20. ¿Ante qué situación o por qué motivo devolvería al perro?",
        QuestionKind::LongText,
        false,
    ),
    ask(
        "q21",
        "21. Cuando salen a pasear, ¿sueltan su perro para que corra libremente? ¿En qué lugar?",
        QuestionKind::LongText,
        false,
    ),
    ask(
        "q22",
        "22. La adopción es para toda la vida del perro, ¿son conscientes de la responsabilidad que esto significa? ¿Asumen esa responsabilidad?",
        QuestionKind::SingleChoice(YES_NO),
        true,
    ),
    ask(
        "q23",
        "23. Realizamos una entrevista previa a la adopción y seguimientos posteriores, ¿está dispuesto a recibir una visita nuestra?",
        QuestionKind::SingleChoice(YES_NO),
        true,
    ),
    ask(
        FILE_MARKER_ID,
        "24. Adjuntar fotos del lugar, patio y dónde vivirá.",
        QuestionKind::FileMarker,
        false,
    ),
    ask(
        "q25",
        "25. El traslado tiene un costo de $20.000. ¿Podrá abonarlo?",
        QuestionKind::SingleChoice(YES_NO),
        true,
    ),
];

/// Position of `id` in the catalog.
#[must_use]
pub fn position(id: &str) -> Option<usize> {
    QUESTIONS.iter().position(|q| q.id == id)
}

#[must_use]
pub fn find(id: &str) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.id == id)
}

pub fn in_section(section: Section) -> impl Iterator<Item = &'static Question> {
    QUESTIONS.iter().filter(move |q| q.section == section)
}
