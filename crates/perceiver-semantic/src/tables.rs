//! Built-in phrase tables, one per locale.
//!
//! Phrases feed the exact and fuzzy tiers after normalization. Keywords are
//! regular-expression fragments for the coarse fallback tier and are matched
//! against normalized text, so they never need to handle punctuation.

use fieldsense_core_types::{FieldType, Locale};

pub(crate) struct FieldPhrases {
    pub field_type: FieldType,
    pub phrases: &'static [&'static str],
    pub keywords: &'static [&'static str],
}

macro_rules! phrase_table {
    ($($field:ident: [$($phrase:literal),* $(,)?] => [$($keyword:literal),* $(,)?];)*) => {
        &[$(FieldPhrases {
            field_type: FieldType::$field,
            phrases: &[$($phrase),*],
            keywords: &[$($keyword),*],
        }),*]
    };
}

const ENGLISH: &[FieldPhrases] = phrase_table! {
    FirstName: ["first name", "given name", "forename", "first", "fname", "legal first name"]
        => ["first ?name", "given ?name", "forename", "fname"];
    MiddleName: ["middle name", "middle initial"] => ["middle ?name", "middle initial", "mname"];
    LastName: ["last name", "surname", "family name", "last", "lname", "legal last name"]
        => ["last ?name", "surname", "family ?name", "lname"];
    FullName: ["full name", "name", "your name", "legal name", "full legal name", "candidate name", "applicant name"]
        => ["full ?name", "legal ?name"];
    PreferredName: ["preferred name", "preferred first name", "nickname"] => ["preferred ?name", "nick ?name"];
    Email: ["email", "email address", "e mail", "e mail address", "work email", "personal email"] => ["e ?mail"];
    Phone: ["phone", "phone number", "mobile", "mobile number", "telephone", "cell phone", "contact number"]
        => ["phone", "mobile", "telephone", "cell"];
    Address: ["address", "street address", "address line 1", "street", "home address", "mailing address", "current address"]
        => ["street", "address"];
    AddressLine2: ["address line 2", "apartment", "suite", "apt", "apartment suite etc"]
        => ["address line 2", "apartment", "suite", "apt"];
    City: ["city", "town", "city town", "current city", "location", "current location"] => ["city", "town"];
    State: ["state", "province", "state province", "region", "county"] => ["state", "province", "region"];
    PostalCode: ["zip", "zip code", "postal code", "postcode", "pin code", "zip postal code"]
        => ["zip", "postal", "post ?code", "pin ?code"];
    Country: ["country", "country of residence", "country region"] => ["country"];
    DateOfBirth: ["date of birth", "birth date", "birthday", "dob"] => ["birth\\w*", "dob"];
    Nationality: ["nationality", "citizenship"] => ["nationality", "citizenship"];
    Pronouns: ["pronouns", "preferred pronouns"] => ["pronouns?"];
    Linkedin: ["linkedin", "linkedin profile", "linkedin url", "linkedin profile url"] => ["linked ?in"];
    Github: ["github", "github profile", "github url"] => ["git ?hub"];
    Website: ["website", "personal website", "portfolio", "portfolio url", "website url", "other website"]
        => ["website", "portfolio", "url"];
    CurrentCompany: ["current company", "company", "employer", "current employer", "company name", "organization", "most recent employer"]
        => ["company", "employer", "organi[sz]ation"];
    CurrentTitle: ["current title", "current job title", "current position", "current role", "current designation", "designation"]
        => ["current (?:job )?title", "designation", "current (?:position|role)"];
    JobTitle: ["job title", "title", "position", "role", "position applied for"] => ["job ?title", "position"];
    YearsOfExperience: ["years of experience", "total experience", "experience", "total years of experience", "years of relevant experience"]
        => ["years? of (?:\\w+ )?experience", "experience"];
    NoticePeriod: ["notice period", "notice", "notice period in days"] => ["notice"];
    AvailableStartDate: ["start date", "available start date", "availability", "earliest start date", "when can you start", "date available"]
        => ["start ?date", "availability", "available"];
    ExpectedCompensation: ["expected ctc", "expected salary", "salary expectations", "salary expectation", "desired salary", "expected compensation", "desired compensation", "salary requirements", "expected pay"]
        => ["expected ctc", "salary", "compensation", "pay"];
    CurrentCompensation: ["current ctc", "current salary", "current compensation", "present salary", "current pay"]
        => ["current (?:ctc|salary|compensation|pay)"];
    SalaryCurrency: ["currency", "salary currency", "preferred currency"] => ["currency"];
    School: ["school", "university", "college", "institution", "school name", "university name"]
        => ["school", "university", "college", "institut(?:e|ion)"];
    Degree: ["degree", "qualification", "highest degree", "highest qualification", "education level"]
        => ["degree", "qualification"];
    FieldOfStudy: ["field of study", "major", "discipline", "specialization", "area of study"]
        => ["major", "field of study", "speciali[sz]ation", "discipline"];
    GraduationYear: ["graduation year", "year of graduation", "graduation date", "passing year"]
        => ["graduat\\w*", "passing year"];
    Gpa: ["gpa", "grade point average", "cgpa", "grade", "percentage"] => ["c?gpa", "grade point"];
    Skills: ["skills", "key skills", "technical skills", "skill set"] => ["skills?"];
    Languages: ["languages", "languages spoken", "language proficiency", "spoken languages"] => ["languages?"];
    Resume: ["resume", "cv", "resume cv", "upload resume", "upload cv", "curriculum vitae", "attach resume", "résumé"]
        => ["resume", "résumé", "cv", "curriculum vitae"];
    CoverLetter: ["cover letter", "covering letter", "motivation letter", "letter of motivation"]
        => ["cover(?:ing)? letter", "motivation"];
    WorkAuthorization: ["work authorization", "authorized to work", "work permit", "right to work", "legally authorized to work", "visa status"]
        => ["authori[sz]\\w*", "work permit", "right to work", "visa"];
    SponsorshipRequired: ["sponsorship", "visa sponsorship", "require sponsorship", "require visa sponsorship"]
        => ["sponsor\\w*"];
    WillingToRelocate: ["relocate", "willing to relocate", "relocation", "open to relocation"] => ["relocat\\w*"];
    HowDidYouHear: ["how did you hear about us", "source", "referral source", "how did you find us", "where did you hear about us", "referred by"]
        => ["hear about", "referral", "referred"];
    Gender: ["gender", "sex", "gender identity"] => ["gender", "sex"];
    Ethnicity: ["ethnicity", "race", "race ethnicity", "ethnic background"] => ["ethnic\\w*", "race"];
    VeteranStatus: ["veteran status", "veteran", "protected veteran"] => ["veteran"];
    DisabilityStatus: ["disability status", "disability", "disabled"] => ["disabilit\\w*", "disabled"];
};

const GERMAN: &[FieldPhrases] = phrase_table! {
    FirstName: ["vorname"] => ["vorname"];
    LastName: ["nachname", "familienname"] => ["nachname", "familienname"];
    FullName: ["vollständiger name", "name", "vor und nachname"] => ["vollständiger name"];
    Email: ["e mail", "e mail adresse", "email adresse", "email"] => ["e ?mail"];
    Phone: ["telefon", "telefonnummer", "handy", "handynummer", "mobilnummer"] => ["telefon\\w*", "handy\\w*", "mobil\\w*"];
    Address: ["adresse", "straße", "strasse", "anschrift", "straße und hausnummer"] => ["adresse", "stra(?:ß|ss)e", "anschrift"];
    City: ["stadt", "ort", "wohnort"] => ["stadt", "wohnort", "ort"];
    State: ["bundesland", "region"] => ["bundesland"];
    PostalCode: ["plz", "postleitzahl"] => ["plz", "postleitzahl"];
    Country: ["land", "wohnsitzland"] => ["land"];
    DateOfBirth: ["geburtsdatum", "geburtstag"] => ["geburt\\w*"];
    Nationality: ["staatsangehörigkeit", "nationalität"] => ["staatsangehörigkeit", "nationalität"];
    CurrentCompany: ["aktueller arbeitgeber", "arbeitgeber", "firma", "unternehmen"] => ["arbeitgeber", "firma", "unternehmen"];
    CurrentTitle: ["aktuelle position", "aktuelle berufsbezeichnung"] => ["berufsbezeichnung"];
    JobTitle: ["stelle", "position", "stellenbezeichnung"] => ["stelle\\w*"];
    YearsOfExperience: ["berufserfahrung", "jahre berufserfahrung"] => ["berufserfahrung", "erfahrung"];
    NoticePeriod: ["kündigungsfrist"] => ["kündigungsfrist"];
    AvailableStartDate: ["eintrittsdatum", "frühester eintrittstermin", "verfügbarkeit"] => ["eintritt\\w*", "verfügbar\\w*"];
    ExpectedCompensation: ["gehaltsvorstellung", "gehaltswunsch", "gewünschtes gehalt"] => ["gehalt\\w*"];
    CurrentCompensation: ["aktuelles gehalt", "derzeitiges gehalt"] => ["(?:aktuelles|derzeitiges) gehalt"];
    SalaryCurrency: ["währung"] => ["währung"];
    School: ["hochschule", "universität", "schule"] => ["hochschule", "universität", "schule"];
    Degree: ["abschluss", "höchster abschluss"] => ["abschluss"];
    FieldOfStudy: ["studiengang", "studienfach", "fachrichtung"] => ["studiengang", "studienfach", "fachrichtung"];
    Skills: ["kenntnisse", "fähigkeiten"] => ["kenntnisse", "fähigkeiten"];
    Languages: ["sprachkenntnisse", "sprachen"] => ["sprach\\w*"];
    Resume: ["lebenslauf", "cv"] => ["lebenslauf", "cv"];
    CoverLetter: ["anschreiben", "motivationsschreiben"] => ["anschreiben", "motivationsschreiben"];
    WorkAuthorization: ["arbeitserlaubnis"] => ["arbeitserlaubnis"];
    WillingToRelocate: ["umzugsbereitschaft"] => ["umzug\\w*"];
    HowDidYouHear: ["wie haben sie von uns erfahren"] => ["von uns erfahren"];
    Gender: ["geschlecht", "anrede"] => ["geschlecht"];
};

const FRENCH: &[FieldPhrases] = phrase_table! {
    FirstName: ["prénom"] => ["prénom"];
    LastName: ["nom", "nom de famille"] => ["nom de famille"];
    FullName: ["nom complet", "nom et prénom"] => ["nom complet"];
    Email: ["e mail", "courriel", "adresse e mail", "adresse électronique"] => ["courriel", "e ?mail"];
    Phone: ["téléphone", "numéro de téléphone", "portable"] => ["téléphone", "portable"];
    Address: ["adresse", "adresse postale"] => ["adresse"];
    City: ["ville"] => ["ville"];
    State: ["région", "département"] => ["région", "département"];
    PostalCode: ["code postal"] => ["code postal"];
    Country: ["pays"] => ["pays"];
    DateOfBirth: ["date de naissance"] => ["naissance"];
    Nationality: ["nationalité"] => ["nationalité"];
    CurrentCompany: ["entreprise actuelle", "employeur", "entreprise", "société"] => ["employeur", "entreprise", "société"];
    CurrentTitle: ["poste actuel", "intitulé du poste actuel"] => ["poste actuel"];
    JobTitle: ["poste", "intitulé du poste"] => ["poste"];
    YearsOfExperience: ["années d'expérience", "expérience"] => ["expérience"];
    NoticePeriod: ["préavis", "délai de préavis"] => ["préavis"];
    AvailableStartDate: ["date de début", "disponibilité", "date de disponibilité"] => ["disponibilit\\w*"];
    ExpectedCompensation: ["prétentions salariales", "salaire souhaité", "rémunération souhaitée"] => ["salaire", "rémunération", "prétentions"];
    CurrentCompensation: ["salaire actuel", "rémunération actuelle"] => ["(?:salaire|rémunération) actuel\\w*"];
    SalaryCurrency: ["devise"] => ["devise"];
    School: ["école", "université", "établissement"] => ["école", "université"];
    Degree: ["diplôme"] => ["diplôme"];
    FieldOfStudy: ["domaine d'études", "spécialité"] => ["spécialité"];
    Skills: ["compétences"] => ["compétences?"];
    Languages: ["langues"] => ["langues?"];
    Resume: ["cv", "curriculum vitae"] => ["cv", "curriculum"];
    CoverLetter: ["lettre de motivation"] => ["lettre de motivation"];
    WorkAuthorization: ["autorisation de travail", "permis de travail"] => ["autorisation de travail", "permis de travail"];
    WillingToRelocate: ["mobilité", "prêt à déménager"] => ["mobilité", "déménag\\w*"];
    Gender: ["genre", "sexe", "civilité"] => ["genre", "sexe"];
};

const SPANISH: &[FieldPhrases] = phrase_table! {
    FirstName: ["nombre", "nombres", "primer nombre"] => ["nombres?"];
    LastName: ["apellido", "apellidos"] => ["apellidos?"];
    FullName: ["nombre completo"] => ["nombre completo"];
    Email: ["correo electrónico", "correo", "email", "e mail"] => ["correo"];
    Phone: ["teléfono", "celular", "móvil", "número de teléfono"] => ["teléfono", "celular", "móvil"];
    Address: ["dirección", "domicilio"] => ["dirección", "domicilio"];
    City: ["ciudad"] => ["ciudad"];
    State: ["estado", "provincia"] => ["provincia"];
    PostalCode: ["código postal"] => ["código postal"];
    Country: ["país"] => ["país"];
    DateOfBirth: ["fecha de nacimiento"] => ["nacimiento"];
    Nationality: ["nacionalidad"] => ["nacionalidad"];
    CurrentCompany: ["empresa actual", "empresa", "empleador"] => ["empresa", "empleador"];
    CurrentTitle: ["cargo actual", "puesto actual"] => ["(?:cargo|puesto) actual"];
    JobTitle: ["puesto", "cargo"] => ["puesto"];
    YearsOfExperience: ["años de experiencia", "experiencia"] => ["experiencia"];
    NoticePeriod: ["periodo de preaviso", "preaviso"] => ["preaviso"];
    AvailableStartDate: ["fecha de inicio", "disponibilidad"] => ["disponibilidad"];
    ExpectedCompensation: ["expectativa salarial", "salario deseado", "pretensión salarial", "aspiración salarial"] => ["salari\\w*"];
    CurrentCompensation: ["salario actual"] => ["salario actual"];
    SalaryCurrency: ["moneda"] => ["moneda"];
    School: ["universidad", "escuela", "institución"] => ["universidad", "escuela"];
    Degree: ["título", "titulación", "grado"] => ["titulación"];
    FieldOfStudy: ["carrera", "área de estudio"] => ["área de estudio"];
    Skills: ["habilidades", "competencias"] => ["habilidades", "competencias"];
    Languages: ["idiomas"] => ["idiomas?"];
    Resume: ["cv", "currículum", "hoja de vida", "curriculum vitae"] => ["cv", "currículum", "hoja de vida"];
    CoverLetter: ["carta de presentación"] => ["carta de presentación"];
    WorkAuthorization: ["permiso de trabajo"] => ["permiso de trabajo"];
    Gender: ["género", "sexo"] => ["género", "sexo"];
};

const PORTUGUESE: &[FieldPhrases] = phrase_table! {
    FirstName: ["nome", "primeiro nome"] => ["primeiro nome"];
    LastName: ["sobrenome", "apelido"] => ["sobrenome"];
    FullName: ["nome completo"] => ["nome completo"];
    Email: ["e mail", "email", "endereço de e mail"] => ["e ?mail"];
    Phone: ["telefone", "celular", "telemóvel"] => ["telefone", "celular", "telemóvel"];
    Address: ["endereço", "morada"] => ["endereço", "morada"];
    City: ["cidade"] => ["cidade"];
    State: ["estado"] => ["estado"];
    PostalCode: ["cep", "código postal"] => ["cep", "código postal"];
    Country: ["país"] => ["país"];
    DateOfBirth: ["data de nascimento"] => ["nascimento"];
    Nationality: ["nacionalidade"] => ["nacionalidade"];
    CurrentCompany: ["empresa atual", "empresa", "empregador"] => ["empresa", "empregador"];
    CurrentTitle: ["cargo atual"] => ["cargo atual"];
    JobTitle: ["cargo", "vaga"] => ["vaga"];
    YearsOfExperience: ["anos de experiência", "experiência"] => ["experiência"];
    NoticePeriod: ["aviso prévio"] => ["aviso prévio"];
    AvailableStartDate: ["data de início", "disponibilidade"] => ["disponibilidade"];
    ExpectedCompensation: ["pretensão salarial", "salário pretendido", "expectativa salarial"] => ["salári\\w*", "salarial"];
    CurrentCompensation: ["salário atual"] => ["salário atual"];
    SalaryCurrency: ["moeda"] => ["moeda"];
    School: ["universidade", "instituição de ensino", "escola"] => ["universidade", "escola"];
    Degree: ["formação", "grau"] => ["formação"];
    FieldOfStudy: ["curso", "área de formação"] => ["curso"];
    Skills: ["habilidades", "competências"] => ["habilidades", "competências"];
    Languages: ["idiomas"] => ["idiomas?"];
    Resume: ["currículo", "cv"] => ["currículo", "cv"];
    CoverLetter: ["carta de apresentação"] => ["carta de apresentação"];
    Gender: ["gênero", "género", "sexo"] => ["gênero", "sexo"];
};

const HINDI: &[FieldPhrases] = phrase_table! {
    FirstName: ["पहला नाम"] => ["पहला नाम"];
    LastName: ["उपनाम", "अंतिम नाम"] => ["उपनाम"];
    FullName: ["पूरा नाम", "नाम"] => ["पूरा नाम"];
    Email: ["ईमेल", "ईमेल पता"] => ["ईमेल"];
    Phone: ["फ़ोन", "फोन", "फ़ोन नंबर", "फोन नंबर", "मोबाइल", "मोबाइल नंबर"] => ["फ़ोन", "फोन", "मोबाइल"];
    Address: ["पता"] => ["पता"];
    City: ["शहर"] => ["शहर"];
    State: ["राज्य"] => ["राज्य"];
    PostalCode: ["पिन कोड"] => ["पिन कोड"];
    Country: ["देश"] => ["देश"];
    DateOfBirth: ["जन्म तिथि"] => ["जन्म"];
    CurrentCompany: ["वर्तमान कंपनी", "कंपनी"] => ["कंपनी"];
    JobTitle: ["पद"] => ["पद"];
    YearsOfExperience: ["अनुभव", "कुल अनुभव"] => ["अनुभव"];
    NoticePeriod: ["नोटिस अवधि"] => ["नोटिस"];
    ExpectedCompensation: ["अपेक्षित वेतन"] => ["वेतन"];
    CurrentCompensation: ["वर्तमान वेतन"] => ["वर्तमान वेतन"];
    School: ["विश्वविद्यालय", "कॉलेज"] => ["विश्वविद्यालय", "कॉलेज"];
    Degree: ["डिग्री"] => ["डिग्री"];
    Skills: ["कौशल"] => ["कौशल"];
    Languages: ["भाषाएँ"] => ["भाषा\\w*"];
    Resume: ["बायोडाटा", "रिज्यूमे"] => ["बायोडाटा", "रिज्यूमे"];
    Gender: ["लिंग"] => ["लिंग"];
};

pub(crate) fn locale_table(locale: Locale) -> &'static [FieldPhrases] {
    match locale {
        Locale::En => ENGLISH,
        Locale::De => GERMAN,
        Locale::Fr => FRENCH,
        Locale::Es => SPANISH,
        Locale::Pt => PORTUGUESE,
        Locale::Hi => HINDI,
    }
}
