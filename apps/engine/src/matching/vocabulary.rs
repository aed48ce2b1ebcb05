/// The curated skill vocabulary used for heuristic extraction.
///
/// Every entry is already lower-case so extraction only needs to normalize
/// the input text. Multi-word entries are matched as contiguous phrases.
/// Spans languages, frameworks, data stores, cloud/infra, process, and soft
/// skills.
pub const SKILL_VOCABULARY: &[&str] = &[
    // Languages
    "javascript",
    "typescript",
    "python",
    "java",
    "c++",
    "c#",
    "golang",
    "rust",
    "ruby",
    "php",
    "swift",
    "kotlin",
    "scala",
    "sql",
    "html",
    "css",
    "bash",
    // Frameworks & runtimes
    "react",
    "angular",
    "vue",
    "svelte",
    "next.js",
    "node.js",
    "express",
    "django",
    "flask",
    "fastapi",
    "spring boot",
    "rails",
    "laravel",
    ".net",
    "graphql",
    "rest api",
    // Data & ML
    "machine learning",
    "deep learning",
    "data analysis",
    "data science",
    "natural language processing",
    "computer vision",
    "tensorflow",
    "pytorch",
    "pandas",
    "numpy",
    "spark",
    // Data stores & messaging
    "postgresql",
    "mysql",
    "mongodb",
    "redis",
    "elasticsearch",
    "kafka",
    "rabbitmq",
    // Cloud & infrastructure
    "aws",
    "azure",
    "gcp",
    "docker",
    "kubernetes",
    "terraform",
    "ansible",
    "jenkins",
    "ci/cd",
    "linux",
    "git",
    "microservices",
    "serverless",
    "devops",
    // Process & practice
    "agile",
    "scrum",
    "kanban",
    "tdd",
    "unit testing",
    "code review",
    "project management",
    // Soft skills
    "communication",
    "leadership",
    "teamwork",
    "problem solving",
    "mentoring",
    "stakeholder management",
];
